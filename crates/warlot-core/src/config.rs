use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::retry::RetryPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "WARLOT_BASE_URL";
pub const ENV_API_KEY: &str = "WARLOT_API_KEY";
pub const ENV_HOLDER_ID: &str = "WARLOT_HOLDER";
pub const ENV_PROJECT_NAME: &str = "WARLOT_PNAME";
/// Seconds.
pub const ENV_TIMEOUT: &str = "WARLOT_TIMEOUT";
pub const ENV_RETRIES: &str = "WARLOT_RETRIES";
pub const ENV_BACKOFF_INIT_MS: &str = "WARLOT_BACKOFF_INIT_MS";
pub const ENV_BACKOFF_MAX_MS: &str = "WARLOT_BACKOFF_MAX_MS";

/// Retry section of config.toml. Values are signed as operators type them;
/// they are normalized when the client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries on 429/5xx and transport errors, after the first attempt.
    pub max_retries: i64,
    pub initial_backoff_ms: i64,
    pub max_backoff_ms: i64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff_ms: 1000,
            max_backoff_ms: 8000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::from_raw(self.max_retries, self.initial_backoff_ms, self.max_backoff_ms)
    }
}

/// Operator configuration loaded from `~/.config/warlot/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarlotConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub holder_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    /// Overrides the library's `warlot-rs/<version>` user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Per-attempt network timeout in seconds.
    pub timeout_secs: u64,
    /// Optional overall deadline per call, in seconds.
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for WarlotConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            holder_id: None,
            project_name: None,
            user_agent: None,
            timeout_secs: 90,
            call_timeout_secs: None,
            retry: RetryConfig::default(),
        }
    }
}

impl WarlotConfig {
    /// Overlay `WARLOT_*` variables read through `lookup`.
    ///
    /// Empty values are ignored, as are numbers that do not parse.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_HOLDER_ID) {
            self.holder_id = Some(v);
        }
        if let Some(v) = get(ENV_PROJECT_NAME) {
            self.project_name = Some(v);
        }
        if let Some(v) = get(ENV_TIMEOUT).and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = v;
        }
        if let Some(v) = get(ENV_RETRIES).and_then(|v| v.trim().parse().ok()) {
            self.retry.max_retries = v;
        }
        if let Some(v) = get(ENV_BACKOFF_INIT_MS).and_then(|v| v.trim().parse().ok()) {
            self.retry.initial_backoff_ms = v;
        }
        if let Some(v) = get(ENV_BACKOFF_MAX_MS).and_then(|v| v.trim().parse().ok()) {
            self.retry.max_backoff_ms = v;
        }
    }

    /// Overlay the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Library configuration for these settings.
    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            holder_id: self.holder_id.clone(),
            project_name: self.project_name.clone(),
            user_agent: self.user_agent.clone().or(defaults.user_agent),
            connect_timeout: defaults.connect_timeout,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            call_timeout: self.call_timeout_secs.map(Duration::from_secs),
            retry: self.retry.policy(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("warlot")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WarlotConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &std::path::Path) -> Result<WarlotConfig> {
    if !path.exists() {
        let default_cfg = WarlotConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: WarlotConfig = toml::from_str(&data)?;
    Ok(cfg)
}
