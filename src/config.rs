//! Client configuration: where the remote auth service lives and how long a
//! request may take. Values come from the builder or from the
//! `DASHGATE_API_URL` environment variable; the defaults point at the public
//! demo service.

use std::time::Duration;
use thiserror::Error;

/// Default remote service URL
const DEFAULT_API_URL: &str = "https://dummyjson.com";

/// Default per-request timeout. Kept short so a stalled intermediary fails
/// the login attempt instead of leaving the form spinning.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid timeout: must be non-zero")]
    InvalidTimeout,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    api_url: String,
    timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let api_url =
            std::env::var("DASHGATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }

    /// Base URL of the remote service
    pub fn base_url(&self) -> &str {
        &self.api_url
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    api_url: Option<String>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Set the remote service URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let api_url = self.api_url.unwrap_or(defaults.api_url);
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(api_url));
        }
        let timeout = self.timeout.unwrap_or(defaults.timeout);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Config { api_url, timeout })
    }
}
