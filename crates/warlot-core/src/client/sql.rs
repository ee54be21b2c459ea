//! SQL execution: buffered, streamed, and mapped into typed rows.

use super::models::{SqlRequest, SqlResponse};
use super::{project_path, Client, Project};
use crate::error::Error;
use crate::executor::CallOptions;
use crate::http::RequestSpec;
use crate::stream::RowStream;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl Client {
    /// Run one statement.
    ///
    /// A 2xx answer with `ok: false` and an error message becomes `Error::Sql`.
    pub fn exec_sql(
        &self,
        project_id: &str,
        req: &SqlRequest,
        opts: &CallOptions,
    ) -> Result<SqlResponse, Error> {
        let spec = self.sql_spec(project_id, req)?;
        let out: SqlResponse = self.executor.execute(&spec, opts)?;
        if !out.ok && !out.error.is_empty() {
            return Err(Error::Sql(out.error));
        }
        Ok(out)
    }

    /// Run one statement and stream the `rows` array of the answer.
    ///
    /// Retries cover only the phase before a 2xx. Once rows are flowing a
    /// failure ends the stream and shows up in `RowStream::last_error`.
    pub fn exec_sql_stream(
        &self,
        project_id: &str,
        req: &SqlRequest,
        opts: &CallOptions,
    ) -> Result<RowStream, Error> {
        let spec = self.sql_spec(project_id, req)?;
        let live = self.executor.execute_streaming(&spec, opts)?;
        Ok(RowStream::from_response(live))
    }

    fn sql_spec(&self, project_id: &str, req: &SqlRequest) -> Result<RequestSpec, Error> {
        self.authed(RequestSpec::post(project_path(project_id, &["sql"])))
            .json(req)
    }
}

/// Run `sql` on `project` and decode every returned row into `T`.
pub fn query<T: DeserializeOwned>(
    project: &Project<'_>,
    sql: &str,
    params: &[Value],
    opts: &CallOptions,
) -> Result<Vec<T>, Error> {
    let res = project.sql(sql, params, opts)?;
    res.rows
        .into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(Error::RowDecode))
        .collect()
}
