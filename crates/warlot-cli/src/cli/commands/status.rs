//! `warlotdev status|commit`.

use super::print_json;
use anyhow::Result;
use warlot_core::{CallOptions, Client};

pub fn run_status(client: &Client, project_id: &str) -> Result<()> {
    let out = client.project_status(project_id, &CallOptions::new().label("status"))?;
    print_json(&out)
}

pub fn run_commit(client: &Client, project_id: &str) -> Result<()> {
    let out = client.commit_project(project_id, &CallOptions::new().label("commit"))?;
    print_json(&out)
}
