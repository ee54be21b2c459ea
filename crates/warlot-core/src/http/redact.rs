//! Header redaction for logs and request hooks.

use super::{Headers, HEADER_API_KEY};

const SECRET_HEADERS: &[&str] = &[HEADER_API_KEY, "authorization", "proxy-authorization"];

/// Mask a secret: keep the first and last four characters of long values,
/// replace short ones entirely.
pub fn redact_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    } else {
        "********".to_string()
    }
}

/// Copy of `headers` with credential-bearing values masked. The input is untouched.
pub fn redact_headers(headers: &[(String, String)]) -> Headers {
    headers
        .iter()
        .map(|(k, v)| {
            let secret = SECRET_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s));
            let v = if secret { redact_value(v) } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}
