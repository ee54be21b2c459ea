//! Retrying request executor.
//!
//! One attempt loop serves both delivery modes. Buffered calls read the whole
//! body and decode it; streaming calls hand the open response to the caller
//! on 2xx. Everything before a 2xx is identical: transport failures, 429 and
//! 5xx are retried with jittered exponential backoff (raised by
//! `Retry-After`), every other status fails the call at once.

mod hooks;
mod options;

pub use hooks::{Hooks, RequestEvent, RequestHook, ResponseEvent, ResponseHook};
pub use options::CallOptions;

use crate::cancel::CallContext;
use crate::error::{Error, TransportError};
use crate::http::transport::{self, Limits, Prepared, SendError};
use crate::http::{redact_headers, set_header, LiveResponse, Method, RequestSpec};
use crate::retry::{
    advance_backoff, build_api_error, is_retryable, is_success, jittered_delay,
    parse_retry_after, RetryPolicy,
};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::time::{Duration, Instant};
use url::Url;

/// Static executor settings, shared read-only by every call.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub base_url: String,
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    /// Per-attempt bound on one send/receive, body included.
    pub timeout: Duration,
    /// Default overall deadline per call; `CallOptions::timeout` overrides it.
    pub call_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy)]
enum Delivery {
    Buffered,
    Streaming,
}

enum Delivered {
    Body(Vec<u8>),
    Live(LiveResponse),
}

enum Attempt {
    Delivered(Delivered),
    Retry {
        error: Error,
        retry_after: Option<Duration>,
    },
    Fail(Error),
}

/// Identity of one attempt, for hooks and logs.
struct AttemptInfo<'a> {
    method: Method,
    url: &'a str,
    attempt: u32,
    label: Option<&'a str>,
}

/// Sends requests against one base URL with retries.
#[derive(Debug, Clone)]
pub struct Executor {
    base_url: Url,
    user_agent: Option<String>,
    connect_timeout: Duration,
    timeout: Duration,
    call_timeout: Option<Duration>,
    policy: RetryPolicy,
    hooks: Hooks,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Result<Self, Error> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| Error::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: config.base_url,
                reason: "cannot be a base".to_string(),
            });
        }
        Ok(Self {
            base_url,
            user_agent: config.user_agent.filter(|ua| !ua.is_empty()),
            connect_timeout: config.connect_timeout,
            timeout: config.timeout,
            call_timeout: config.call_timeout,
            policy: config.retry.normalized(),
            hooks: Hooks::default(),
        })
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a buffered call and decode the 2xx body into `T`.
    ///
    /// An empty body yields `T::default()`. A body that does not decode is a
    /// terminal `Error::Decode`; it is never retried.
    pub fn execute<T>(&self, spec: &RequestSpec, opts: &CallOptions) -> Result<T, Error>
    where
        T: DeserializeOwned + Default,
    {
        let body = self.execute_raw(spec, opts)?;
        decode_body(&body)
    }

    /// Run a buffered call and return the raw 2xx body.
    pub fn execute_raw(&self, spec: &RequestSpec, opts: &CallOptions) -> Result<Vec<u8>, Error> {
        match self.run(spec, opts, Delivery::Buffered)? {
            Delivered::Body(body) => Ok(body),
            Delivered::Live(mut live) => live.read_all().map_err(|e| Error::Transport {
                method: spec.method.to_string(),
                url: spec.path(),
                source: TransportError::Body(e),
            }),
        }
    }

    /// Run a call and return the open 2xx response without reading its body.
    ///
    /// Only the phase before a 2xx is retried. The caller owns the connection
    /// from here on and releases it by dropping the response.
    pub fn execute_streaming(
        &self,
        spec: &RequestSpec,
        opts: &CallOptions,
    ) -> Result<LiveResponse, Error> {
        match self.run(spec, opts, Delivery::Streaming)? {
            Delivered::Live(live) => Ok(live),
            Delivered::Body(_) => Err(Error::Transport {
                method: spec.method.to_string(),
                url: spec.path(),
                source: TransportError::NoResponse,
            }),
        }
    }

    /// Absolute URL for `spec`, each path segment percent-encoded.
    pub fn url_for(&self, spec: &RequestSpec) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(spec.segments.iter());
        if !spec.query.is_empty() {
            url.query_pairs_mut().extend_pairs(spec.query.iter());
        }
        Ok(url)
    }

    fn run(
        &self,
        spec: &RequestSpec,
        opts: &CallOptions,
        delivery: Delivery,
    ) -> Result<Delivered, Error> {
        let url = self.url_for(spec)?.to_string();
        let policy = opts.retry.map(RetryPolicy::normalized).unwrap_or(self.policy);
        let deadline = opts
            .timeout
            .or(self.call_timeout)
            .map(|t| Instant::now() + t);
        let limits = Limits {
            connect_timeout: self.connect_timeout,
            timeout: self.timeout,
            ctx: CallContext::new(opts.cancel.clone().unwrap_or_default(), deadline),
        };
        let label = opts.label.as_deref();

        let mut backoff = policy.initial_backoff;
        let mut attempt = 0u32;
        loop {
            let info = AttemptInfo {
                method: spec.method,
                url: &url,
                attempt,
                label,
            };
            let prepared = self.prepare(spec, &url, opts);
            self.observe_request(&info, &prepared);

            let (error, retry_after) = match self.attempt(&info, prepared, &limits, delivery) {
                Attempt::Delivered(d) => return Ok(d),
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry { error, retry_after } => (error, retry_after),
            };
            if attempt >= policy.max_retries {
                return Err(Error::Exhausted {
                    attempts: attempt + 1,
                    source: Box::new(error),
                });
            }

            let mut delay = jittered_delay(backoff, policy.max_backoff);
            if let Some(ra) = retry_after {
                delay = delay.max(ra);
            }
            tracing::warn!(
                method = %spec.method,
                url = %url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying after error: {}",
                error
            );
            limits.ctx.sleep(delay)?;
            backoff = advance_backoff(backoff, policy.max_backoff);
            attempt += 1;
        }
    }

    /// Fresh request for one attempt: static headers first, then the
    /// request's own headers, then per-call headers.
    fn prepare(&self, spec: &RequestSpec, url: &str, opts: &CallOptions) -> Prepared {
        let mut headers = Vec::with_capacity(spec.headers.len() + opts.headers.len() + 2);
        set_header(&mut headers, "Content-Type", "application/json");
        if let Some(ua) = &self.user_agent {
            set_header(&mut headers, "User-Agent", ua.as_str());
        }
        headers.extend(spec.headers.iter().cloned());
        headers.extend(opts.headers.iter().cloned());
        Prepared {
            method: spec.method,
            url: url.to_string(),
            headers,
            body: spec.body.clone(),
        }
    }

    fn attempt(
        &self,
        info: &AttemptInfo<'_>,
        prepared: Prepared,
        limits: &Limits,
        delivery: Delivery,
    ) -> Attempt {
        let transport_error = |source| Error::Transport {
            method: info.method.to_string(),
            url: info.url.to_string(),
            source,
        };

        let mut live = match transport::send(prepared, limits) {
            Ok(live) => live,
            Err(SendError::Interrupted(i)) => {
                self.observe_response(info, None, None, Some(&TransportError::Interrupted(i)));
                return Attempt::Fail(i.into());
            }
            Err(SendError::Transport(e)) => {
                self.observe_response(info, None, None, Some(&e));
                return Attempt::Retry {
                    error: transport_error(e),
                    retry_after: None,
                };
            }
        };
        let status = live.status();

        if is_success(status) {
            if let Delivery::Streaming = delivery {
                self.observe_response(info, Some(status), None, None);
                return Attempt::Delivered(Delivered::Live(live));
            }
            return match live.read_all() {
                Ok(body) => {
                    self.observe_response(info, Some(status), Some(&body), None);
                    Attempt::Delivered(Delivered::Body(body))
                }
                Err(e) => {
                    if let Some(i) = limits.ctx.interrupted() {
                        let e = TransportError::Interrupted(i);
                        self.observe_response(info, Some(status), None, Some(&e));
                        return Attempt::Fail(i.into());
                    }
                    let e = TransportError::Body(e);
                    self.observe_response(info, Some(status), None, Some(&e));
                    Attempt::Retry {
                        error: transport_error(e),
                        retry_after: None,
                    }
                }
            };
        }

        // Error bodies are drained and the connection closed before any retry.
        // A truncated error body still yields a usable ApiError.
        let mut body = Vec::new();
        let _ = live.read_to_end(&mut body);
        let retry_after = live.header("retry-after").and_then(parse_retry_after);
        drop(live);
        self.observe_response(info, Some(status), Some(&body), None);

        let api = build_api_error(status, &body);
        if !is_retryable(status) {
            return Attempt::Fail(Error::Api(api));
        }
        Attempt::Retry {
            error: Error::Api(api),
            retry_after,
        }
    }

    fn observe_request(&self, info: &AttemptInfo<'_>, prepared: &Prepared) {
        let redacted = redact_headers(&prepared.headers);
        tracing::debug!(
            method = %info.method,
            url = %info.url,
            attempt = info.attempt,
            label = info.label.unwrap_or(""),
            headers = ?redacted,
            "request"
        );
        self.hooks.fire_request(&RequestEvent {
            method: info.method,
            url: info.url,
            headers: &redacted,
            attempt: info.attempt,
            label: info.label,
        });
    }

    fn observe_response(
        &self,
        info: &AttemptInfo<'_>,
        status: Option<u16>,
        body: Option<&[u8]>,
        error: Option<&TransportError>,
    ) {
        tracing::debug!(
            method = %info.method,
            url = %info.url,
            attempt = info.attempt,
            status = status.unwrap_or(0),
            body_len = body.map(|b| b.len()).unwrap_or(0),
            error = error.map(|e| e.to_string()).unwrap_or_default(),
            "response"
        );
        self.hooks.fire_response(&ResponseEvent {
            method: info.method,
            url: info.url,
            status,
            body,
            error: error.map(|e| e as &(dyn std::error::Error + 'static)),
            attempt: info.attempt,
            label: info.label,
        });
    }
}

/// Decode a 2xx body. Blank bodies become `T::default()`.
pub(crate) fn decode_body<T>(body: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|source| Error::Decode {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}

#[cfg(test)]
mod tests;
