//! Tests for global flags and settings resolution.

use super::parse_cli;
use crate::cli::commands::SqlArgs;
use crate::cli::{require, GlobalArgs};
use warlot_core::config::WarlotConfig;

#[test]
fn global_flags_work_after_the_subcommand() {
    let cli = parse_cli(&[
        "warlotdev",
        "status",
        "--project",
        "p1",
        "--base",
        "http://localhost:8080",
        "--holder",
        "0xH",
        "--pname",
        "shop",
        "--apikey",
        "k",
        "--timeout",
        "5",
        "--retries",
        "2",
        "--backoff-init",
        "100",
        "--backoff-max",
        "400",
        "-v",
    ]);
    let g = cli.global;
    assert_eq!(g.base.as_deref(), Some("http://localhost:8080"));
    assert_eq!(g.holder.as_deref(), Some("0xH"));
    assert_eq!(g.pname.as_deref(), Some("shop"));
    assert_eq!(g.apikey.as_deref(), Some("k"));
    assert_eq!(g.timeout, Some(5));
    assert_eq!(g.retries, Some(2));
    assert_eq!(g.backoff_init, Some(100));
    assert_eq!(g.backoff_max, Some(400));
    assert!(g.verbose);
}

#[test]
fn global_flags_work_before_the_subcommand() {
    let cli = parse_cli(&["warlotdev", "--retries", "-1", "resolve"]);
    assert_eq!(cli.global.retries, Some(-1));
    assert!(!cli.global.verbose);
}

#[test]
fn flags_override_config_and_env() {
    let mut cfg = WarlotConfig::default();
    cfg.apply_env(|k| match k {
        "WARLOT_HOLDER" => Some("env-holder".to_string()),
        "WARLOT_RETRIES" => Some("7".to_string()),
        _ => None,
    });
    let flags = GlobalArgs {
        holder: Some("flag-holder".into()),
        backoff_max: Some(500),
        ..GlobalArgs::default()
    };
    flags.apply(&mut cfg);
    assert_eq!(cfg.holder_id.as_deref(), Some("flag-holder"));
    assert_eq!(cfg.retry.max_retries, 7);
    assert_eq!(cfg.retry.max_backoff_ms, 500);
    assert_eq!(cfg.retry.initial_backoff_ms, 1000);
}

#[test]
fn require_names_the_missing_flag() {
    let err = require(&None, "holder").unwrap_err();
    assert_eq!(err.to_string(), "missing required --holder");
    let err = require(&Some("   ".into()), "pname").unwrap_err();
    assert_eq!(err.to_string(), "missing required --pname");
    assert_eq!(require(&Some("x".into()), "apikey").unwrap(), "x");
}

#[test]
fn sql_params_must_be_a_json_array() {
    use crate::cli::commands::parse_params;
    assert!(parse_params(None).unwrap().is_empty());
    assert!(parse_params(Some("  ")).unwrap().is_empty());
    let params = parse_params(Some(r#"["Laptop", 999.99]"#)).unwrap();
    assert_eq!(params.len(), 2);
    assert!(parse_params(Some(r#"{"a":1}"#)).is_err());
}

#[test]
fn sql_requires_credentials_before_any_request() {
    let client = warlot_core::Client::new(warlot_core::ClientConfig {
        base_url: "http://127.0.0.1:9/".into(),
        ..Default::default()
    })
    .unwrap();
    let settings = WarlotConfig {
        holder_id: Some("0xH".into()),
        project_name: Some("shop".into()),
        ..WarlotConfig::default()
    };
    let err = crate::cli::commands::run_sql(
        &client,
        &settings,
        &SqlArgs {
            project: "p1",
            query: "SELECT 1",
            params: None,
            idempotency: None,
            stream: false,
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "missing required --apikey");
}
