//! Cancellation and deadlines for a logical call.
//!
//! A `CancelToken` is shared between the caller and the call; cancelling it
//! aborts an in-flight transfer and wakes a backoff sleep immediately. A
//! `CallContext` pairs the token with the overall call deadline.

use crate::error::Error;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Clonable cancellation signal. All clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake every waiter.
    pub fn cancel(&self) {
        let (flag, cv) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cv.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns true if cancelled before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cv) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cv
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Why a call stopped before reaching a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Cancelled => f.write_str("request cancelled"),
            Interrupt::DeadlineExceeded => f.write_str("call deadline exceeded"),
        }
    }
}

impl From<Interrupt> for Error {
    fn from(i: Interrupt) -> Self {
        match i {
            Interrupt::Cancelled => Error::Cancelled,
            Interrupt::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

/// Cancellation state for one logical call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(cancel: CancelToken, deadline: Option<Instant>) -> Self {
        Self { cancel, deadline }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancellation wins over an expired deadline when both hold.
    pub fn interrupted(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    /// Sleep between attempts.
    ///
    /// Fails at once with `DeadlineExceeded` when the deadline would pass
    /// before the sleep ends, and with `Cancelled` as soon as the token fires.
    pub fn sleep(&self, delay: Duration) -> Result<(), Error> {
        if let Some(i) = self.interrupted() {
            return Err(i.into());
        }
        if let Some(deadline) = self.deadline {
            if delay > deadline.saturating_duration_since(Instant::now()) {
                return Err(Error::DeadlineExceeded);
            }
        }
        if self.cancel.wait_timeout(delay) {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
