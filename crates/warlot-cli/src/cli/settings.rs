//! Global flags and the settings they resolve to: flags over environment
//! over config file.

use anyhow::{bail, Result};
use clap::Args;
use warlot_core::config::{self, WarlotConfig};

/// Flags accepted before or after any subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// API base URL [env WARLOT_BASE_URL].
    #[arg(long, global = true)]
    pub base: Option<String>,
    /// API key [env WARLOT_API_KEY].
    #[arg(long, global = true)]
    pub apikey: Option<String>,
    /// Holder ID [env WARLOT_HOLDER].
    #[arg(long, global = true)]
    pub holder: Option<String>,
    /// Project name [env WARLOT_PNAME].
    #[arg(long, global = true)]
    pub pname: Option<String>,
    /// Per-request timeout in seconds [env WARLOT_TIMEOUT, default 90].
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Retries on 429/5xx [env WARLOT_RETRIES, default 5].
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub retries: Option<i64>,
    /// Initial backoff in ms [env WARLOT_BACKOFF_INIT_MS, default 1000].
    #[arg(long, global = true, value_name = "MS", allow_negative_numbers = true)]
    pub backoff_init: Option<i64>,
    /// Maximum backoff in ms [env WARLOT_BACKOFF_MAX_MS, default 8000].
    #[arg(long, global = true, value_name = "MS", allow_negative_numbers = true)]
    pub backoff_max: Option<i64>,
    /// Log every request and response to stderr (API key redacted).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Config file, then `WARLOT_*` environment, then these flags.
    pub fn settings(&self) -> Result<WarlotConfig> {
        let mut cfg = match config::load_or_init() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("config unavailable, using defaults: {:#}", e);
                WarlotConfig::default()
            }
        };
        cfg.apply_process_env();
        self.apply(&mut cfg);
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut WarlotConfig) {
        if let Some(v) = &self.base {
            cfg.base_url = v.clone();
        }
        if let Some(v) = &self.apikey {
            cfg.api_key = Some(v.clone());
        }
        if let Some(v) = &self.holder {
            cfg.holder_id = Some(v.clone());
        }
        if let Some(v) = &self.pname {
            cfg.project_name = Some(v.clone());
        }
        if let Some(v) = self.timeout {
            cfg.timeout_secs = v;
        }
        if let Some(v) = self.retries {
            cfg.retry.max_retries = v;
        }
        if let Some(v) = self.backoff_init {
            cfg.retry.initial_backoff_ms = v;
        }
        if let Some(v) = self.backoff_max {
            cfg.retry.max_backoff_ms = v;
        }
    }
}

/// The value of a required setting, or an error naming its flag.
pub fn require<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("missing required --{}", flag),
    }
}
