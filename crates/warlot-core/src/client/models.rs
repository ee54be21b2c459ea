//! Request and response bodies of the gateway endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row as returned by the gateway: column name to value.
pub type Row = Map<String, Value>;

/// Free-form object bodies (schema, status, commit).
pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InitProjectRequest {
    pub holder_id: String,
    pub project_name: String,
    pub owner_address: String,
    #[serde(default)]
    pub epoch_set: i64,
    #[serde(default)]
    pub cycle_end: i64,
    #[serde(default)]
    pub writers_len: i64,
    #[serde(default)]
    pub track_back_len: i64,
    #[serde(default)]
    pub draft_epoch_dur: i64,
    pub include_pass: bool,
    pub deletable: bool,
}

/// The init endpoint answers with capitalized keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct InitProjectResponse {
    #[serde(rename = "ProjectID")]
    pub project_id: String,
    #[serde(rename = "DBID")]
    pub db_id: String,
    #[serde(rename = "WriterPassID")]
    pub writer_pass_id: String,
    #[serde(rename = "BlobID")]
    pub blob_id: String,
    pub tx_digest: String,
    #[serde(rename = "CSVHashHex")]
    pub csv_hash_hex: String,
    pub digest_hex: String,
    pub signature_hex: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueKeyRequest {
    pub project_id: String,
    pub project_holder: String,
    pub project_name: String,
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueKeyResponse {
    pub api_key: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResolveProjectRequest {
    pub holder_id: String,
    pub project_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolveProjectResponse {
    pub exists_meta: bool,
    pub exists_chain: bool,
    pub project_id: String,
    pub db_id: String,
    pub action: String,
    /// Older deployments reply with `ProjectID`/`DBID` only.
    #[serde(rename = "ProjectID", skip_serializing_if = "String::is_empty")]
    pub legacy_project_id: String,
    #[serde(rename = "DBID", skip_serializing_if = "String::is_empty")]
    pub legacy_db_id: String,
}

impl ResolveProjectResponse {
    /// Fill the modern id fields from the legacy ones when they are empty.
    pub fn normalize_legacy(&mut self) {
        if self.project_id.is_empty() && !self.legacy_project_id.is_empty() {
            self.project_id = self.legacy_project_id.clone();
        }
        if self.db_id.is_empty() && !self.legacy_db_id.is_empty() {
            self.db_id = self.legacy_db_id.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SqlRequest {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlRequest {
    pub fn new(sql: impl Into<String>, params: impl Into<Vec<Value>>) -> Self {
        Self {
            sql: sql.into(),
            params: params.into(),
        }
    }
}

/// Writes report `row_count`; reads report `rows`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqlResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListTablesResponse {
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseRowsResponse {
    pub limit: u32,
    pub offset: u64,
    pub table: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableCountResponse {
    pub project_id: String,
    pub table_count: i64,
}
