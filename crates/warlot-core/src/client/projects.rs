//! Project lifecycle: init, API key issuance, resolve. Sent without
//! credential headers.

use super::models::{
    InitProjectRequest, InitProjectResponse, IssueKeyRequest, IssueKeyResponse,
    ResolveProjectRequest, ResolveProjectResponse,
};
use super::Client;
use crate::error::Error;
use crate::executor::CallOptions;
use crate::http::RequestSpec;

impl Client {
    pub fn init_project(
        &self,
        req: &InitProjectRequest,
        opts: &CallOptions,
    ) -> Result<InitProjectResponse, Error> {
        let spec = RequestSpec::post(["warlotSql", "projects", "init"]).json(req)?;
        self.executor.execute(&spec, opts)
    }

    pub fn issue_api_key(
        &self,
        req: &IssueKeyRequest,
        opts: &CallOptions,
    ) -> Result<IssueKeyResponse, Error> {
        let spec = RequestSpec::post(["auth", "issue"]).json(req)?;
        self.executor.execute(&spec, opts)
    }

    /// Look up a project by holder and name.
    pub fn resolve_project(
        &self,
        req: &ResolveProjectRequest,
        opts: &CallOptions,
    ) -> Result<ResolveProjectResponse, Error> {
        let spec = RequestSpec::post(["warlotSql", "projects", "resolve"]).json(req)?;
        let mut out: ResolveProjectResponse = self.executor.execute(&spec, opts)?;
        out.normalize_legacy();
        Ok(out)
    }
}
