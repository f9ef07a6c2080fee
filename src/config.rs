//! Client configuration.
//!
//! Read from the environment at startup:
//! - `TAKO_API_URL` - base URL of the task service (legacy: `NEXT_PUBLIC_API_URL`)
//! - `TAKO_REQUEST_TIMEOUT_SECS` - per-request timeout in seconds

use std::time::Duration;
use thiserror::Error;

/// Base URL used when no override is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("Invalid request timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// A blank `TAKO_API_URL` counts as unset, so the legacy name still applies.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_url = var("TAKO_API_URL").or_else(|| var("NEXT_PUBLIC_API_URL"));
        let timeout = var("TAKO_REQUEST_TIMEOUT_SECS");
        Self::from_values(api_url.as_deref(), timeout.as_deref())
    }

    /// Build a config from raw (possibly absent) values.
    ///
    /// Empty strings are treated as absent.
    pub fn from_values(api_url: Option<&str>, timeout_secs: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = api_url.map(str::trim).filter(|s| !s.is_empty()) {
            config = config.with_api_url(url)?;
        }

        if let Some(raw) = timeout_secs.map(str::trim).filter(|s| !s.is_empty()) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_string()))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Replace the base URL after validating it.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(url.to_string(), e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidUrl(
                    url.to_string(),
                    format!("unsupported scheme '{}'", other),
                ))
            }
        }
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Full URL for an endpoint path such as `/tasks`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
