//! Project-scoped handle.

use super::models::{
    BrowseRowsResponse, JsonObject, ListTablesResponse, Row, SqlRequest, SqlResponse,
    TableCountResponse,
};
use super::Client;
use crate::error::Error;
use crate::executor::CallOptions;
use crate::pager::Pager;
use crate::stream::RowStream;
use serde_json::Value;

/// Boxed page fetch used by [`TablePager`].
pub type FetchPage<'p> = Box<dyn FnMut(u64, u32) -> Result<Vec<Row>, Error> + 'p>;

/// Pager over the raw rows of one table.
pub type TablePager<'p> = Pager<Row, FetchPage<'p>>;

/// A client bound to one project id.
#[derive(Debug, Clone)]
pub struct Project<'c> {
    client: &'c Client,
    id: String,
}

impl<'c> Project<'c> {
    pub(crate) fn new(client: &'c Client, id: String) -> Self {
        Self { client, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &'c Client {
        self.client
    }

    pub fn sql(&self, sql: &str, params: &[Value], opts: &CallOptions) -> Result<SqlResponse, Error> {
        self.client.exec_sql(&self.id, &SqlRequest::new(sql, params), opts)
    }

    pub fn stream(&self, sql: &str, params: &[Value], opts: &CallOptions) -> Result<RowStream, Error> {
        self.client.exec_sql_stream(&self.id, &SqlRequest::new(sql, params), opts)
    }

    pub fn tables(&self, opts: &CallOptions) -> Result<ListTablesResponse, Error> {
        self.client.list_tables(&self.id, opts)
    }

    pub fn browse(
        &self,
        table: &str,
        limit: u32,
        offset: u64,
        opts: &CallOptions,
    ) -> Result<BrowseRowsResponse, Error> {
        self.client.browse_rows(&self.id, table, limit, offset, opts)
    }

    pub fn schema(&self, table: &str, opts: &CallOptions) -> Result<JsonObject, Error> {
        self.client.table_schema(&self.id, table, opts)
    }

    pub fn count(&self, opts: &CallOptions) -> Result<TableCountResponse, Error> {
        self.client.table_count(&self.id, opts)
    }

    pub fn status(&self, opts: &CallOptions) -> Result<JsonObject, Error> {
        self.client.project_status(&self.id, opts)
    }

    pub fn commit(&self, opts: &CallOptions) -> Result<JsonObject, Error> {
        self.client.commit_project(&self.id, opts)
    }

    /// Page through `table`, `page_size` rows at a time, starting at offset 0.
    pub fn pager<'p>(
        &'p self,
        table: &'p str,
        page_size: u32,
        opts: &'p CallOptions,
    ) -> TablePager<'p> {
        let fetch: FetchPage<'p> =
            Box::new(move |offset, limit| Ok(self.browse(table, limit, offset, opts)?.rows));
        Pager::new(page_size, fetch)
    }
}
