//! Configuration loaded from environment variables.
//!
//! [`Config`] is read once at startup. Secrets and database parameters are
//! read per request through [`EnvSource`] so a rotated key takes effect
//! without a restart.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;

/// Default W&B GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.wandb.ai/graphql";

/// Startup configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log filter (trace, debug, info, warn, error or a full directive).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub log_json: bool,

    // === Upstream Configuration ===
    /// W&B GraphQL endpoint.
    #[serde(default = "default_graphql_url")]
    pub wandb_graphql_url: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub wandb_timeout_secs: u64,

    // === Metrics ===
    /// Start the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Port for the Prometheus exporter.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_graphql_url() -> String {
    DEFAULT_GRAPHQL_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            rust_log: default_log_level(),
            log_json: false,
            wandb_graphql_url: default_graphql_url(),
            wandb_timeout_secs: default_timeout_secs(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.wandb_graphql_url)
            .map_err(|e| format!("WANDB_GRAPHQL_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err("WANDB_GRAPHQL_URL must use http or https".to_string());
        }

        if self.wandb_timeout_secs == 0 {
            return Err("WANDB_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if self.metrics_enabled && self.metrics_port == self.port {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }
}

/// Values read from the environment on every request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeEnv {
    #[serde(default)]
    wandb_api_key: Option<String>,
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    database_name: Option<String>,
}

impl RuntimeEnv {
    /// The upstream API key. Empty values count as missing.
    pub fn api_key(&self) -> Result<&str, ApiError> {
        non_empty(&self.wandb_api_key).ok_or(ApiError::MissingApiKey)
    }

    /// Whether `DATABASE_URL` is set.
    pub fn database_url_set(&self) -> bool {
        non_empty(&self.database_url).is_some()
    }

    /// Whether `DATABASE_NAME` is set.
    pub fn database_name_set(&self) -> bool {
        non_empty(&self.database_name).is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Where request-time values come from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The live process environment.
    #[default]
    Process,
    /// A fixed set of variables, used by tests and embedders.
    Fixed(Arc<Vec<(String, String)>>),
}

impl EnvSource {
    /// Build a fixed source from key/value pairs.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Fixed(Arc::new(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    /// Snapshot the request-time values.
    pub fn read(&self) -> RuntimeEnv {
        let result = match self {
            EnvSource::Process => envy::from_env::<RuntimeEnv>(),
            EnvSource::Fixed(vars) => envy::from_iter::<_, RuntimeEnv>(vars.iter().cloned()),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read runtime environment");
            RuntimeEnv::default()
        })
    }
}
