//! Typed client over the gateway endpoints.
//!
//! Every wrapper builds a `RequestSpec` and runs it through the shared
//! executor; only `exec_sql_stream` takes the streaming path.

pub mod models;
mod project;
mod projects;
mod sql;
mod tables;

pub use project::{FetchPage, Project, TablePager};
pub use sql::query;

use crate::error::Error;
use crate::executor::{Executor, ExecutorConfig, Hooks};
use crate::http::{Headers, RequestSpec, HEADER_API_KEY, HEADER_HOLDER_ID, HEADER_PROJECT_NAME};
use crate::retry::RetryPolicy;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://warlot-api.onrender.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to build a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub holder_id: Option<String>,
    pub project_name: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    /// Per-attempt network timeout.
    pub timeout: Duration,
    /// Overall deadline for each call, retries and sleeps included.
    pub call_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            holder_id: None,
            project_name: None,
            user_agent: Some(format!("warlot-rs/{}", env!("CARGO_PKG_VERSION"))),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            call_timeout: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Gateway client. Cheap to clone; configuration is fixed after construction.
#[derive(Debug, Clone)]
pub struct Client {
    executor: Executor,
    api_key: Option<String>,
    holder_id: Option<String>,
    project_name: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let executor = Executor::new(ExecutorConfig {
            base_url: config.base_url,
            user_agent: config.user_agent,
            connect_timeout: config.connect_timeout,
            timeout: config.timeout,
            call_timeout: config.call_timeout,
            retry: config.retry,
        })?;
        Ok(Self {
            executor,
            api_key: non_empty(config.api_key),
            holder_id: non_empty(config.holder_id),
            project_name: non_empty(config.project_name),
        })
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.executor = self.executor.with_hooks(hooks);
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Handle bound to one project id.
    pub fn project(&self, id: impl Into<String>) -> Project<'_> {
        Project::new(self, id.into())
    }

    /// Credential headers for project-scoped calls; unset values are skipped.
    pub(crate) fn auth_headers(&self) -> Headers {
        [
            (HEADER_API_KEY, &self.api_key),
            (HEADER_HOLDER_ID, &self.holder_id),
            (HEADER_PROJECT_NAME, &self.project_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }

    pub(crate) fn authed(&self, spec: RequestSpec) -> RequestSpec {
        spec.headers(self.auth_headers())
    }
}

/// Path segments under `/warlotSql/projects/{id}`.
pub(crate) fn project_path<'a>(id: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec!["warlotSql", "projects", id];
    segments.extend_from_slice(rest);
    segments
}
