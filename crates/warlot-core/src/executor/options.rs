//! Per-call options.

use crate::cancel::CancelToken;
use crate::http::{set_header, Headers, HEADER_IDEMPOTENCY_KEY};
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Options for a single call: extra headers, a diagnostic label,
/// cancellation, an overall deadline and an optional retry policy override.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub(crate) headers: Headers,
    pub(crate) label: Option<String>,
    pub(crate) cancel: Option<CancelToken>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry: Option<RetryPolicy>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an idempotency key so retried writes are applied once server-side.
    /// The same value is sent on every attempt.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        set_header(&mut self.headers, HEADER_IDEMPOTENCY_KEY, key);
        self
    }

    /// Append an arbitrary header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Tag the call in logs and hook events.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Overall deadline for the call, all attempts and sleeps included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use this policy instead of the client's for this call only.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
