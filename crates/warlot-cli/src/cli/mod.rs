//! CLI for the Warlot SQL gateway.

mod commands;
mod settings;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use settings::{require, GlobalArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "warlotdev")]
#[command(about = "warlotdev: developer CLI for the Warlot SQL API", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a project by holder and name.
    Resolve,

    /// Initialize a new project.
    Init {
        /// Owner address.
        #[arg(long)]
        owner: String,
        /// Include pass artifacts.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
        include_pass: bool,
        /// Whether the project can be deleted.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
        deletable: bool,
    },

    /// Issue an API key for a project.
    IssueKey {
        #[command(flatten)]
        project: ProjectArg,
        /// User address the key is issued to.
        #[arg(long)]
        user: String,
    },

    /// Run one SQL statement.
    Sql {
        #[command(flatten)]
        project: ProjectArg,
        /// SQL text.
        #[arg(short = 'q', long = "query")]
        query: String,
        /// Parameters as a JSON array, e.g. '["Laptop", 999.99]'.
        #[arg(long)]
        params: Option<String>,
        /// Idempotency key for writes.
        #[arg(long)]
        idempotency: Option<String>,
        /// Stream rows, printing one JSON object per line.
        #[arg(long)]
        stream: bool,
    },

    /// Table introspection.
    Tables {
        #[command(subcommand)]
        command: TablesCommand,
    },

    /// Show project status.
    Status {
        #[command(flatten)]
        project: ProjectArg,
    },

    /// Commit pending writes.
    Commit {
        #[command(flatten)]
        project: ProjectArg,
    },

    /// Apply pending *.sql migrations from a directory.
    Migrate {
        #[command(flatten)]
        project: ProjectArg,
        /// Directory holding migration files.
        #[arg(long)]
        dir: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum TablesCommand {
    /// List tables.
    List {
        #[command(flatten)]
        project: ProjectArg,
    },

    /// Browse rows of a table.
    Browse {
        #[command(flatten)]
        project: ProjectArg,
        #[arg(long)]
        table: String,
        #[arg(long, default_value = "10")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u64,
        /// Walk every page, `limit` rows at a time.
        #[arg(long)]
        all: bool,
    },

    /// Show a table's schema.
    Schema {
        #[command(flatten)]
        project: ProjectArg,
        #[arg(long)]
        table: String,
    },

    /// Count tables in the project.
    Count {
        #[command(flatten)]
        project: ProjectArg,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ProjectArg {
    /// Project ID.
    #[arg(long = "project", value_name = "ID")]
    pub id: String,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let settings = self.global.settings()?;
        tracing::debug!(base_url = %settings.base_url, "resolved settings");
        let client = warlot_core::Client::new(settings.client_config())?;

        match self.command {
            CliCommand::Resolve => commands::run_resolve(&client, &settings)?,
            CliCommand::Init {
                owner,
                include_pass,
                deletable,
            } => commands::run_init(&client, &settings, &owner, include_pass, deletable)?,
            CliCommand::IssueKey { project, user } => {
                commands::run_issue_key(&client, &settings, &project.id, &user)?
            }
            CliCommand::Sql {
                project,
                query,
                params,
                idempotency,
                stream,
            } => commands::run_sql(
                &client,
                &settings,
                &commands::SqlArgs {
                    project: &project.id,
                    query: &query,
                    params: params.as_deref(),
                    idempotency: idempotency.as_deref(),
                    stream,
                },
            )?,
            CliCommand::Tables { command } => commands::run_tables(&client, command)?,
            CliCommand::Status { project } => commands::run_status(&client, &project.id)?,
            CliCommand::Commit { project } => commands::run_commit(&client, &project.id)?,
            CliCommand::Migrate { project, dir } => {
                commands::run_migrate(&client, &settings, &project.id, &dir)?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
