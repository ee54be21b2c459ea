//! Integration tests: retry loop, backoff, Retry-After, cancellation and
//! hooks against a scripted local gateway.

mod common;

use common::gateway_server::{self, Reply};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use warlot_core::error::TransportError;
use warlot_core::{CallOptions, CancelToken, Client, ClientConfig, Error, Hooks, RetryPolicy};

const PROJECT: &str = "p1";

fn client(url: &str, retries: u32, backoff_ms: u64) -> Client {
    Client::new(ClientConfig {
        base_url: url.to_string(),
        api_key: Some("wk_live_0123456789abcdef".to_string()),
        holder_id: Some("0xholder".to_string()),
        project_name: Some("shop".to_string()),
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: retries,
            initial_backoff: Duration::from_millis(backoff_ms),
            max_backoff: Duration::from_millis(backoff_ms * 4),
        },
        ..ClientConfig::default()
    })
    .unwrap()
}

fn ok_tables() -> Reply {
    Reply::json(200, json!({"tables": ["products"]}))
}

#[test]
fn retryable_status_uses_whole_budget() {
    let gw = gateway_server::always(Reply::json(503, json!({"message": "busy"})));
    let err = client(&gw.url, 3, 10)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap_err();
    assert_eq!(gw.count(), 4);
    assert!(err.is_exhausted());
    assert_eq!(err.status(), Some(503));
    match err {
        Error::Exhausted { attempts, .. } => assert_eq!(attempts, 4),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn zero_retries_means_one_attempt() {
    let gw = gateway_server::always(Reply::json(500, json!({})));
    let err = client(&gw.url, 0, 10)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap_err();
    assert_eq!(gw.count(), 1);
    assert!(err.is_exhausted());
}

#[test]
fn client_error_is_not_retried() {
    let gw = gateway_server::always(Reply::json(
        400,
        json!({"error": "bad sql", "code": "E_SQL", "details": {"pos": 3}}),
    ));
    let err = client(&gw.url, 5, 10)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap_err();
    assert_eq!(gw.count(), 1);
    let api = err.api().expect("api error");
    assert_eq!(api.status, 400);
    assert_eq!(api.message, "bad sql");
    assert_eq!(api.code.as_deref(), Some("E_SQL"));
    assert_eq!(api.details, Some(json!({"pos": 3})));
    assert!(!err.is_exhausted());
}

#[test]
fn recovers_after_transient_failures() {
    let gw = gateway_server::sequence(vec![
        Reply::json(502, json!({})),
        Reply::json(429, json!({})),
        ok_tables(),
    ]);
    let out = client(&gw.url, 3, 10)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap();
    assert_eq!(out.tables, vec!["products"]);
    assert_eq!(gw.count(), 3);
}

#[test]
fn retry_after_raises_the_wait() {
    let gw = gateway_server::sequence(vec![
        Reply::json(503, json!({})).header("Retry-After", "1"),
        ok_tables(),
    ]);
    client(&gw.url, 2, 200)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap();
    let reqs = gw.requests();
    assert_eq!(reqs.len(), 2);
    let gap = reqs[1].at.duration_since(reqs[0].at);
    assert!(gap >= Duration::from_millis(900), "waited only {:?}", gap);
}

#[test]
fn idempotency_key_and_body_repeat_on_every_attempt() {
    let gw = gateway_server::sequence(vec![
        Reply::json(503, json!({})),
        Reply::json(500, json!({})),
        Reply::json(200, json!({"ok": true, "row_count": 1})),
    ]);
    let c = client(&gw.url, 3, 10);
    let opts = CallOptions::new().idempotency_key("insert-42");
    let res = c
        .project(PROJECT)
        .sql("INSERT INTO t (name) VALUES (?)", &[json!("alice")], &opts)
        .unwrap();
    assert_eq!(res.row_count, Some(1));

    let reqs = gw.requests();
    assert_eq!(reqs.len(), 3);
    for r in &reqs {
        assert_eq!(r.header("x-idempotency-key"), Some("insert-42"));
        assert_eq!(r.body, reqs[0].body);
    }
    assert_eq!(
        reqs[0].json(),
        json!({"sql": "INSERT INTO t (name) VALUES (?)", "params": ["alice"]})
    );
}

#[test]
fn transport_errors_share_the_retry_budget() {
    let url = gateway_server::closed_port_url();
    let responses = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&responses);
    let hooks = Hooks::new().on_response(move |ev| {
        seen.lock()
            .unwrap()
            .push((ev.attempt, ev.status, ev.error.is_some()));
    });
    let err = client(&url, 2, 10)
        .with_hooks(hooks)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap_err();
    match &err {
        Error::Exhausted { attempts, source } => {
            assert_eq!(*attempts, 3);
            assert!(matches!(
                **source,
                Error::Transport {
                    source: TransportError::Curl(_),
                    ..
                }
            ));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(err.api().is_none());
    assert_eq!(
        *responses.lock().unwrap(),
        vec![(0, None, true), (1, None, true), (2, None, true)]
    );
}

#[test]
fn hooks_fire_once_per_attempt_with_redacted_key() {
    let gw = gateway_server::sequence(vec![Reply::json(503, json!({})), ok_tables()]);
    let events = Arc::new(Mutex::new(Vec::new()));
    let (req_log, resp_log) = (Arc::clone(&events), Arc::clone(&events));
    let hooks = Hooks::new()
        .on_request(move |ev| {
            let key = ev
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-api-key"))
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            req_log
                .lock()
                .unwrap()
                .push(format!("req {} {} {}", ev.attempt, ev.label.unwrap_or("-"), key));
        })
        .on_response(move |ev| {
            resp_log.lock().unwrap().push(format!(
                "resp {} {}",
                ev.attempt,
                ev.status.unwrap_or(0)
            ));
        });
    client(&gw.url, 2, 10)
        .with_hooks(hooks)
        .list_tables(PROJECT, &CallOptions::new().label("tables"))
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "req 0 tables wk_l…cdef",
            "resp 0 503",
            "req 1 tables wk_l…cdef",
            "resp 1 200",
        ]
    );
    // The wire still carries the real credential.
    for r in gw.requests() {
        assert_eq!(r.header("x-api-key"), Some("wk_live_0123456789abcdef"));
    }
}

#[test]
fn malformed_success_body_is_terminal() {
    let gw = gateway_server::always(Reply::new(200, "<html>maintenance</html>"));
    let err = client(&gw.url, 3, 10)
        .list_tables(PROJECT, &CallOptions::new())
        .unwrap_err();
    assert_eq!(gw.count(), 1);
    match err {
        Error::Decode { body, .. } => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_success_body_decodes_to_default() {
    let gw = gateway_server::always(Reply::new(200, ""));
    let out = client(&gw.url, 0, 10)
        .commit_project(PROJECT, &CallOptions::new())
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn cancel_interrupts_backoff_sleep() {
    let gw = gateway_server::always(Reply::json(503, json!({})));
    let c = client(&gw.url, 5, 5_000);
    let token = CancelToken::new();
    let trigger = token.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });
    let started = Instant::now();
    let err = c
        .list_tables(PROJECT, &CallOptions::new().cancel_token(token))
        .unwrap_err();
    assert!(err.is_cancelled(), "unexpected: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(gw.count(), 1);
}

#[test]
fn cancel_interrupts_waiting_for_response() {
    let gw = gateway_server::always(ok_tables().delay(Duration::from_secs(5)));
    let c = client(&gw.url, 3, 10);
    let token = CancelToken::new();
    let trigger = token.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });
    let started = Instant::now();
    let err = c
        .list_tables(PROJECT, &CallOptions::new().cancel_token(token))
        .unwrap_err();
    assert!(err.is_cancelled(), "unexpected: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn cancelled_attempt_still_fires_response_hook() {
    let gw = gateway_server::always(ok_tables().delay(Duration::from_secs(3)));
    let requests = Arc::new(Mutex::new(0u32));
    let responses = Arc::new(Mutex::new(Vec::new()));
    let (rq, rs) = (Arc::clone(&requests), Arc::clone(&responses));
    let hooks = Hooks::new()
        .on_request(move |_| *rq.lock().unwrap() += 1)
        .on_response(move |ev| {
            rs.lock()
                .unwrap()
                .push((ev.status, ev.error.map(|e| e.to_string())))
        });
    let c = client(&gw.url, 3, 10).with_hooks(hooks);
    let token = CancelToken::new();
    let trigger = token.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        trigger.cancel();
    });
    let err = c
        .list_tables(PROJECT, &CallOptions::new().cancel_token(token))
        .unwrap_err();
    assert!(err.is_cancelled(), "unexpected: {err:?}");
    assert_eq!(*requests.lock().unwrap(), 1);
    assert_eq!(
        *responses.lock().unwrap(),
        vec![(None, Some("request cancelled".to_string()))]
    );
}

#[test]
fn huge_retry_after_with_deadline_fails_cleanly() {
    let gw = gateway_server::always(
        Reply::json(503, json!({})).header("Retry-After", "18446744073709551615"),
    );
    let started = Instant::now();
    let err = client(&gw.url, 3, 10)
        .list_tables(PROJECT, &CallOptions::new().timeout(Duration::from_secs(5)))
        .unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded), "unexpected: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(gw.count(), 1);
}

#[test]
fn deadline_shorter_than_backoff_fails_fast() {
    let gw = gateway_server::always(Reply::json(503, json!({})));
    let c = client(&gw.url, 5, 5_000);
    let started = Instant::now();
    let err = c
        .list_tables(PROJECT, &CallOptions::new().timeout(Duration::from_millis(500)))
        .unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded), "unexpected: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(gw.count(), 1);
}

#[test]
fn per_attempt_timeout_counts_as_transport_failure() {
    let gw = gateway_server::always(ok_tables().delay(Duration::from_secs(3)));
    let c = Client::new(ClientConfig {
        base_url: gw.url.clone(),
        timeout: Duration::from_millis(300),
        retry: RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(10),
        },
        ..ClientConfig::default()
    })
    .unwrap();
    let started = Instant::now();
    let err = c.list_tables(PROJECT, &CallOptions::new()).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(3));
    match err {
        Error::Exhausted { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*source, Error::Transport { .. }));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(gw.count(), 2);
}

#[test]
fn per_call_policy_overrides_client_policy() {
    let gw = gateway_server::always(Reply::json(503, json!({})));
    let c = client(&gw.url, 5, 10);
    let opts = CallOptions::new().retry_policy(RetryPolicy {
        max_retries: 1,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(5),
    });
    let err = c.list_tables(PROJECT, &opts).unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(gw.count(), 2);
}
