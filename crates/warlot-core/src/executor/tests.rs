use super::*;
use crate::http::{header_value, HEADER_API_KEY};
use serde::Deserialize;

fn executor(base: &str) -> Executor {
    Executor::new(ExecutorConfig {
        base_url: base.to_string(),
        user_agent: Some("warlot-rs/test".to_string()),
        connect_timeout: Duration::from_secs(1),
        timeout: Duration::from_secs(1),
        call_timeout: None,
        retry: RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        },
    })
    .unwrap()
}

#[test]
fn new_normalizes_zero_backoff() {
    let ex = executor("http://127.0.0.1:9/");
    assert_eq!(ex.policy().max_retries, 2);
    assert_eq!(ex.policy().initial_backoff, Duration::from_millis(300));
    assert_eq!(ex.policy().max_backoff, Duration::from_secs(3));
}

#[test]
fn new_rejects_unusable_base_url() {
    let err = Executor::new(ExecutorConfig {
        base_url: "not a url".to_string(),
        user_agent: None,
        connect_timeout: Duration::from_secs(1),
        timeout: Duration::from_secs(1),
        call_timeout: None,
        retry: RetryPolicy::default(),
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}

#[test]
fn url_for_escapes_each_segment() {
    let ex = executor("http://gw.local/api/");
    let spec = RequestSpec::get(["warlotSql", "projects", "p/1 x", "tables"])
        .query_pair("limit", "10")
        .query_pair("offset", "20");
    let url = ex.url_for(&spec).unwrap();
    assert_eq!(
        url.as_str(),
        "http://gw.local/api/warlotSql/projects/p%2F1%20x/tables?limit=10&offset=20"
    );
}

#[test]
fn url_for_without_trailing_slash_on_base() {
    let ex = executor("http://gw.local");
    let url = ex.url_for(&RequestSpec::post(["auth", "issue"])).unwrap();
    assert_eq!(url.as_str(), "http://gw.local/auth/issue");
}

#[test]
fn prepare_orders_static_then_request_then_call_headers() {
    let ex = executor("http://gw.local/");
    let spec = RequestSpec::post(["x"]).headers(vec![(
        HEADER_API_KEY.to_string(),
        "secret-key-value".to_string(),
    )]);
    let opts = CallOptions::new().idempotency_key("k-1");
    let prepared = ex.prepare(&spec, "http://gw.local/x", &opts);
    let names: Vec<&str> = prepared.headers.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        names,
        vec!["Content-Type", "User-Agent", "x-api-key", "x-idempotency-key"]
    );
    assert_eq!(header_value(&prepared.headers, "user-agent"), Some("warlot-rs/test"));
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Payload {
    #[serde(default)]
    ok: bool,
}

#[test]
fn blank_body_decodes_to_default() {
    let p: Payload = decode_body(b"  \n").unwrap();
    assert_eq!(p, Payload::default());
    let p: Payload = decode_body(b"").unwrap();
    assert!(!p.ok);
}

#[test]
fn malformed_body_is_decode_error_with_raw_text() {
    let err = decode_body::<Payload>(b"<html>oops</html>").unwrap_err();
    match err {
        Error::Decode { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("unexpected error: {other:?}"),
    }
}
