//! CLI command handlers, one file per command group.

mod migrate;
mod project;
mod sql;
mod status;
mod tables;

pub use migrate::run_migrate;
pub use project::{run_init, run_issue_key, run_resolve};
pub use sql::{run_sql, SqlArgs};
#[cfg(test)]
pub(crate) use sql::parse_params;
pub use status::{run_commit, run_status};
pub use tables::run_tables;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as indented JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `value` as one line of JSON on stdout.
pub(crate) fn print_json_line<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
