//! Classify HTTP status codes and turn error bodies into `ApiError`.

use crate::error::ApiError;
use serde::Deserialize;

/// 2xx.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// True for 429 and every 5xx; all other statuses are terminal.
pub fn is_retryable(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// Build an `ApiError` from a non-2xx response.
///
/// The body is parsed best-effort as `{message, error, code, details}`;
/// `error` stands in for an absent or empty `message`. The raw body is kept
/// verbatim either way.
pub fn build_api_error(status: u16, body: &[u8]) -> ApiError {
    let raw = String::from_utf8_lossy(body).into_owned();
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .or(parsed.error.filter(|e| !e.is_empty()))
        .unwrap_or_default();
    ApiError {
        status,
        body: raw,
        message,
        code: parsed.code.filter(|c| !c.is_empty()),
        details: parsed.details.filter(|d| !d.is_null()),
    }
}
