//! HTTP plumbing: request descriptors, response heads, header redaction and
//! the libcurl transport.

mod head;
mod redact;
pub(crate) mod transport;

pub use head::ResponseHead;
pub use redact::{redact_headers, redact_value};
pub use transport::LiveResponse;

use crate::error::Error;
use serde::Serialize;

pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_HOLDER_ID: &str = "x-holder-id";
pub const HEADER_PROJECT_NAME: &str = "x-project-name";
pub const HEADER_IDEMPOTENCY_KEY: &str = "x-idempotency-key";

/// Ordered header list; names compare case-insensitively, duplicates allowed.
pub type Headers = Vec<(String, String)>;

/// Set `name` to `value`, removing previous values of the same header.
pub fn set_header(headers: &mut Headers, name: &str, value: impl Into<String>) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.into()));
}

/// First value of `name`, if present.
pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical request, independent of any attempt.
///
/// Path segments are kept unescaped and percent-encoded one by one when the
/// URL is built. The body is serialized once; every attempt sends a fresh
/// copy of those bytes.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl RequestSpec {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::Get, segments)
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::Post, segments)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body).map_err(Error::Encode)?);
        Ok(self)
    }

    pub fn query_pair(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Display form of the path, used in logs.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}
