//! `Retry-After` header parsing (delta-seconds or HTTP-date).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// Parse a `Retry-After` value into a wait duration.
///
/// Integers are seconds. Dates yield the time remaining until that instant,
/// and only when it lies in the future. Anything else yields `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    parse_retry_after_at(value, Utc::now())
}

fn parse_retry_after_at(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = parse_http_date(value)?;
    (at - now).to_std().ok().filter(|d| !d.is_zero())
}

/// Obsolete HTTP-date forms, both implicitly GMT.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// IMF-fixdate (RFC 1123) first, then RFC 850, then asctime.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
