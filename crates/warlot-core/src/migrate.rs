//! Forward-only SQL migrations tracked in a `_migrations` table.

use crate::client::{query, Project};
use crate::executor::CallOptions;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS _migrations (\n  id TEXT PRIMARY KEY,\n  applied_at TEXT NOT NULL\n)";
const SELECT_APPLIED: &str = "SELECT id FROM _migrations";
const RECORD_APPLIED: &str = "INSERT INTO _migrations (id, applied_at) VALUES (?, ?)";

#[derive(Debug, Deserialize)]
struct Applied {
    id: String,
}

/// Applies `*.sql` files from a directory in file-name order, each at most once.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    opts: CallOptions,
}

impl Migrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for every call the run makes (cancellation, deadline, label).
    /// Each migration still gets its own idempotency key.
    pub fn with_options(opts: CallOptions) -> Self {
        Self { opts }
    }

    /// Apply pending migrations; returns the file names applied by this run.
    pub fn up(&self, project: &Project<'_>, dir: &Path) -> Result<Vec<String>> {
        project
            .sql(CREATE_LEDGER, &[], &self.opts)
            .context("create _migrations")?;

        let files = migration_files(dir)?;
        let done: HashSet<String> = query::<Applied>(project, SELECT_APPLIED, &[], &self.opts)
            .context("load applied migrations")?
            .into_iter()
            .map(|a| a.id)
            .collect();

        let mut applied = Vec::new();
        for (name, path) in files {
            if done.contains(&name) {
                tracing::debug!(migration = %name, "already applied");
                continue;
            }
            let sql = fs::read_to_string(&path).with_context(|| format!("read {}", name))?;
            project
                .sql(
                    &sql,
                    &[],
                    &self.opts.clone().idempotency_key(format!("mig-{}", name)),
                )
                .with_context(|| format!("apply {}", name))?;

            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
            project
                .sql(
                    RECORD_APPLIED,
                    &[Value::from(name.as_str()), Value::from(now)],
                    &self.opts,
                )
                .with_context(|| format!("record {}", name))?;
            tracing::info!(migration = %name, project = project.id(), "migration applied");
            applied.push(name);
        }
        Ok(applied)
    }
}

/// Regular files ending in `.sql` (any case), sorted by file name.
fn migration_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_ascii_lowercase().ends_with(".sql") {
            files.push((name, entry.path()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
