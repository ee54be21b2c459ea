//! Table introspection, project status and commit.

use super::models::{BrowseRowsResponse, JsonObject, ListTablesResponse, TableCountResponse};
use super::{project_path, Client};
use crate::error::Error;
use crate::executor::CallOptions;
use crate::http::RequestSpec;

impl Client {
    pub fn list_tables(
        &self,
        project_id: &str,
        opts: &CallOptions,
    ) -> Result<ListTablesResponse, Error> {
        let spec = self.authed(RequestSpec::get(project_path(project_id, &["tables"])));
        self.executor.execute(&spec, opts)
    }

    /// One page of raw rows. `limit` and `offset` are sent only when non-zero.
    pub fn browse_rows(
        &self,
        project_id: &str,
        table: &str,
        limit: u32,
        offset: u64,
        opts: &CallOptions,
    ) -> Result<BrowseRowsResponse, Error> {
        let mut spec = self.authed(RequestSpec::get(project_path(
            project_id,
            &["tables", table, "rows"],
        )));
        if limit > 0 {
            spec = spec.query_pair("limit", limit.to_string());
        }
        if offset > 0 {
            spec = spec.query_pair("offset", offset.to_string());
        }
        self.executor.execute(&spec, opts)
    }

    pub fn table_schema(
        &self,
        project_id: &str,
        table: &str,
        opts: &CallOptions,
    ) -> Result<JsonObject, Error> {
        let spec = self.authed(RequestSpec::get(project_path(
            project_id,
            &["tables", table, "schema"],
        )));
        self.executor.execute(&spec, opts)
    }

    pub fn table_count(
        &self,
        project_id: &str,
        opts: &CallOptions,
    ) -> Result<TableCountResponse, Error> {
        let spec = self.authed(RequestSpec::get(project_path(
            project_id,
            &["tables", "count"],
        )));
        self.executor.execute(&spec, opts)
    }

    pub fn project_status(&self, project_id: &str, opts: &CallOptions) -> Result<JsonObject, Error> {
        let spec = self.authed(RequestSpec::get(project_path(project_id, &["status"])));
        self.executor.execute(&spec, opts)
    }

    /// Ask the gateway to commit pending writes. Pair with an idempotency key
    /// when the call may be retried.
    pub fn commit_project(&self, project_id: &str, opts: &CallOptions) -> Result<JsonObject, Error> {
        let spec = self
            .authed(RequestSpec::post(project_path(project_id, &["commit"])))
            .json(&JsonObject::new())?;
        self.executor.execute(&spec, opts)
    }
}
