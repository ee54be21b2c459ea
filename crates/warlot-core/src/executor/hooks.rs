//! Observation hooks fired around every attempt.
//!
//! Hooks run synchronously on the calling thread in registration order.
//! A panicking hook unwinds through the call.

use crate::http::Method;
use std::fmt;
use std::sync::Arc;

/// Fired once per attempt, before the request is sent.
#[derive(Debug)]
pub struct RequestEvent<'a> {
    pub method: Method,
    pub url: &'a str,
    /// Outgoing headers with credentials masked.
    pub headers: &'a [(String, String)],
    /// 0-based attempt index within the call.
    pub attempt: u32,
    pub label: Option<&'a str>,
}

/// Fired once per attempt, after a response (or transport failure).
#[derive(Debug)]
pub struct ResponseEvent<'a> {
    pub method: Method,
    pub url: &'a str,
    /// `None` when no response was received.
    pub status: Option<u16>,
    /// `None` when the body was not read (transport failure, or a stream
    /// handed to the caller unread).
    pub body: Option<&'a [u8]>,
    pub error: Option<&'a (dyn std::error::Error + 'static)>,
    pub attempt: u32,
    pub label: Option<&'a str>,
}

pub type RequestHook = Arc<dyn Fn(&RequestEvent<'_>) + Send + Sync>;
pub type ResponseHook = Arc<dyn Fn(&ResponseEvent<'_>) + Send + Sync>;

/// Registered hooks. Read-only once attached to an executor.
#[derive(Clone, Default)]
pub struct Hooks {
    on_request: Vec<RequestHook>,
    on_response: Vec<ResponseHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_request", &self.on_request.len())
            .field("on_response", &self.on_response.len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestEvent<'_>) + Send + Sync + 'static,
    {
        self.on_request.push(Arc::new(f));
        self
    }

    pub fn on_response<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResponseEvent<'_>) + Send + Sync + 'static,
    {
        self.on_response.push(Arc::new(f));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on_request.is_empty() && self.on_response.is_empty()
    }

    pub(crate) fn fire_request(&self, ev: &RequestEvent<'_>) {
        for h in &self.on_request {
            h(ev);
        }
    }

    pub(crate) fn fire_response(&self, ev: &ResponseEvent<'_>) {
        for h in &self.on_response {
            h(ev);
        }
    }
}
