//! `warlotdev migrate` – apply pending migration files.

use crate::cli::require;
use anyhow::Result;
use std::path::Path;
use warlot_core::config::WarlotConfig;
use warlot_core::{CallOptions, Client, Migrator};

pub fn run_migrate(
    client: &Client,
    settings: &WarlotConfig,
    project_id: &str,
    dir: &Path,
) -> Result<()> {
    require(&settings.api_key, "apikey")?;
    let migrator = Migrator::with_options(CallOptions::new().label("migrate"));
    let applied = migrator.up(&client.project(project_id), dir)?;
    if applied.is_empty() {
        println!("No pending migrations.");
    } else {
        for name in &applied {
            println!("applied {}", name);
        }
    }
    Ok(())
}
