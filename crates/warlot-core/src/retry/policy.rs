use rand::Rng;
use std::time::Duration;

/// Retries after the first attempt when nothing else is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Substituted for a zero or negative initial backoff.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(300);
/// Substituted for a zero or negative maximum backoff.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(3);

/// Jittered exponential backoff policy.
///
/// `max_retries` counts retries, not attempts: 0 means a single attempt.
/// A policy is read-only for the lifetime of one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from signed values as they come from config, env or flags.
    /// Negative retry counts become 0; non-positive backoffs get the defaults.
    pub fn from_raw(max_retries: i64, initial_backoff_ms: i64, max_backoff_ms: i64) -> Self {
        let (initial_backoff, max_backoff) =
            normalize_backoff(millis(initial_backoff_ms), millis(max_backoff_ms));
        Self {
            max_retries: u32::try_from(max_retries.max(0)).unwrap_or(u32::MAX),
            initial_backoff,
            max_backoff,
        }
    }

    /// Same policy with zero backoffs replaced by the defaults.
    pub fn normalized(self) -> Self {
        let (initial_backoff, max_backoff) =
            normalize_backoff(self.initial_backoff, self.max_backoff);
        Self {
            initial_backoff,
            max_backoff,
            ..self
        }
    }

    /// Total number of attempts a call may make.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

/// Ensure both backoff bounds are strictly positive.
///
/// Ordering between the two is left to the caller; `jittered_delay` and
/// `advance_backoff` clamp to `max` regardless.
pub fn normalize_backoff(initial: Duration, max: Duration) -> (Duration, Duration) {
    let initial = if initial.is_zero() {
        DEFAULT_INITIAL_BACKOFF
    } else {
        initial
    };
    let max = if max.is_zero() { DEFAULT_MAX_BACKOFF } else { max };
    (initial, max)
}

/// Uniform delay in `[backoff / 2, backoff]`, never above `max`.
pub fn jittered_delay(backoff: Duration, max: Duration) -> Duration {
    let upper = u64::try_from(backoff.as_nanos()).unwrap_or(u64::MAX);
    let lower = upper / 2;
    let nanos = rand::thread_rng().gen_range(lower..=upper);
    Duration::from_nanos(nanos).min(max)
}

/// Next backoff: double the current one, capped at `max`.
pub fn advance_backoff(backoff: Duration, max: Duration) -> Duration {
    backoff.saturating_mul(2).min(max)
}
