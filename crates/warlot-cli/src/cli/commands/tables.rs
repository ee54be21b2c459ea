//! `warlotdev tables ...` – list, browse, schema, count.

use super::{print_json, print_json_line};
use crate::cli::TablesCommand;
use anyhow::Result;
use warlot_core::{CallOptions, Client};

/// Page size for `browse --all` when `--limit 0` is given.
const DEFAULT_PAGE: u32 = 100;

pub fn run_tables(client: &Client, command: TablesCommand) -> Result<()> {
    let opts = CallOptions::new().label("tables");
    match command {
        TablesCommand::List { project } => {
            print_json(&client.project(project.id).tables(&opts)?)
        }
        TablesCommand::Browse {
            project,
            table,
            limit,
            offset,
            all,
        } => {
            let project = client.project(project.id);
            if !all {
                return print_json(&project.browse(&table, limit, offset, &opts)?);
            }
            let page = if limit == 0 { DEFAULT_PAGE } else { limit };
            let mut pager = project.pager(&table, page, &opts);
            let mut total = 0usize;
            while let Some(rows) = pager.next_page()? {
                total += rows.len();
                for row in &rows {
                    print_json_line(row)?;
                }
            }
            tracing::debug!(table = %table, rows = total, "browse --all finished");
            Ok(())
        }
        TablesCommand::Schema { project, table } => {
            print_json(&client.project(project.id).schema(&table, &opts)?)
        }
        TablesCommand::Count { project } => {
            print_json(&client.project(project.id).count(&opts)?)
        }
    }
}
