//! Error types returned by the client.

use std::fmt;

/// Structured representation of a non-2xx gateway response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    /// Response body exactly as received (lossy UTF-8).
    pub body: String,
    /// `message`, or `error` when `message` was absent; empty if neither parsed.
    pub message: String,
    pub code: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = if self.message.is_empty() {
            &self.body
        } else {
            &self.message
        };
        match &self.code {
            Some(code) => write!(f, "warlot API {} ({}): {}", self.status, code, msg),
            None => write!(f, "warlot API {}: {}", self.status, msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Failure below HTTP: no usable response was obtained.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Reading the body failed after the head arrived (e.g. peer reset).
    #[error("read response body: {0}")]
    Body(#[source] std::io::Error),
    #[error("spawn transfer worker: {0}")]
    Spawn(#[source] std::io::Error),
    /// Worker finished without producing a response head.
    #[error("no response received")]
    NoResponse,
    /// The attempt was abandoned because the call was cancelled or ran out of time.
    #[error("{0}")]
    Interrupted(crate::cancel::Interrupt),
}

/// Any error a client call can return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-2xx response (terminal, or the last one before retries ran out).
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: TransportError,
    },

    /// Every permitted attempt failed with a retryable error.
    #[error("warlot request failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// 2xx response whose body did not match the expected shape. Never retried.
    #[error("decode response: {source} (body={body})")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The gateway answered `ok: false` with an error string.
    #[error("sql: {0}")]
    Sql(String),

    #[error("row decoding failed: {0}")]
    RowDecode(#[source] serde_json::Error),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// The structured API error, looking through `Exhausted`.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            Error::Exhausted { source, .. } => source.api(),
            _ => None,
        }
    }

    /// HTTP status of the underlying API error, if any.
    pub fn status(&self) -> Option<u16> {
        self.api().map(|e| e.status)
    }

    /// True when the underlying API status is one the executor retries.
    pub fn is_retryable_status(&self) -> bool {
        self.status().map(crate::retry::is_retryable).unwrap_or(false)
    }

    /// True when the call gave up after using its whole retry budget.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
