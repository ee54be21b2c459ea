//! Retry and backoff policy.
//!
//! This module owns the pieces of the retry decision that do not touch the
//! network: backoff normalization and jitter, `Retry-After` parsing, and
//! status classification. The executor combines them into the attempt loop.

mod classify;
mod policy;
mod retry_after;

pub use classify::{build_api_error, is_retryable, is_success};
pub use policy::{
    advance_backoff, jittered_delay, normalize_backoff, RetryPolicy, DEFAULT_INITIAL_BACKOFF,
    DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES,
};
pub use retry_after::parse_retry_after;
