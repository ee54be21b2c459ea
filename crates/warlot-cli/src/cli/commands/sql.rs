//! `warlotdev sql` – run a statement, buffered or streamed.

use super::{print_json, print_json_line};
use crate::cli::require;
use anyhow::{Context, Result};
use serde_json::Value;
use warlot_core::config::WarlotConfig;
use warlot_core::{CallOptions, Client};

#[derive(Debug, Clone, Copy)]
pub struct SqlArgs<'a> {
    pub project: &'a str,
    pub query: &'a str,
    pub params: Option<&'a str>,
    pub idempotency: Option<&'a str>,
    pub stream: bool,
}

/// Parse `--params`; blank means no parameters.
pub(crate) fn parse_params(raw: Option<&str>) -> Result<Vec<Value>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).context("invalid --params JSON (expected an array)"),
    }
}

pub fn run_sql(client: &Client, settings: &WarlotConfig, args: &SqlArgs<'_>) -> Result<()> {
    require(&settings.holder_id, "holder")?;
    require(&settings.project_name, "pname")?;
    require(&settings.api_key, "apikey")?;
    if args.query.trim().is_empty() {
        anyhow::bail!("missing required -q");
    }
    let params = parse_params(args.params)?;

    let mut opts = CallOptions::new().label("sql");
    if let Some(key) = args.idempotency.filter(|k| !k.is_empty()) {
        opts = opts.idempotency_key(key);
    }

    let project = client.project(args.project);
    if !args.stream {
        let res = project.sql(args.query, &params, &opts)?;
        return print_json(&res);
    }

    let mut rows = project.stream(args.query, &params, &opts)?;
    let mut row = Value::Null;
    while rows.next(&mut row) {
        print_json_line(&row)?;
    }
    if let Some(e) = rows.take_error() {
        return Err(anyhow::Error::new(e).context(format!(
            "stream read error after {} rows",
            rows.rows_read()
        )));
    }
    Ok(())
}
