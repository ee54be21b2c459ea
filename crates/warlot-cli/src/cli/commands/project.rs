//! `warlotdev resolve|init|issue-key` – project lifecycle.

use super::print_json;
use crate::cli::require;
use anyhow::Result;
use warlot_core::config::WarlotConfig;
use warlot_core::{
    CallOptions, Client, InitProjectRequest, IssueKeyRequest, ResolveProjectRequest,
};

pub fn run_resolve(client: &Client, settings: &WarlotConfig) -> Result<()> {
    let req = ResolveProjectRequest {
        holder_id: require(&settings.holder_id, "holder")?.to_string(),
        project_name: require(&settings.project_name, "pname")?.to_string(),
    };
    let out = client.resolve_project(&req, &CallOptions::new().label("resolve"))?;
    print_json(&out)
}

pub fn run_init(
    client: &Client,
    settings: &WarlotConfig,
    owner: &str,
    include_pass: bool,
    deletable: bool,
) -> Result<()> {
    let holder = require(&settings.holder_id, "holder")?;
    let pname = require(&settings.project_name, "pname")?;
    if owner.trim().is_empty() {
        anyhow::bail!("missing required --owner");
    }
    let req = InitProjectRequest {
        holder_id: holder.to_string(),
        project_name: pname.to_string(),
        owner_address: owner.to_string(),
        include_pass,
        deletable,
        ..InitProjectRequest::default()
    };
    let out = client.init_project(&req, &CallOptions::new().label("init"))?;
    print_json(&out)
}

pub fn run_issue_key(
    client: &Client,
    settings: &WarlotConfig,
    project_id: &str,
    user: &str,
) -> Result<()> {
    let req = IssueKeyRequest {
        project_id: project_id.to_string(),
        project_holder: require(&settings.holder_id, "holder")?.to_string(),
        project_name: require(&settings.project_name, "pname")?.to_string(),
        user: user.to_string(),
    };
    let out = client.issue_api_key(&req, &CallOptions::new().label("issue-key"))?;
    print_json(&out)
}
