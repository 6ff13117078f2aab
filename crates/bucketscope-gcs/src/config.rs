//! Storage client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default JSON API root.
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/storage/v1";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the storage HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GcsConfig {
    /// Root of the storage JSON API
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-base-url", env = "GCS_BASE_URL", default_value = DEFAULT_BASE_URL)
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl GcsConfig {
    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("bucketscope/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the API root, e.g. to point at a local emulator.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GcsConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http_timeout, 30);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GcsConfig::default()
            .with_base_url("http://localhost:4443/storage/v1")
            .with_timeout(5)
            .with_user_agent("probe/1.0");

        assert_eq!(config.base_url, "http://localhost:4443/storage/v1");
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
        assert_eq!(config.effective_user_agent(), "probe/1.0");
    }

    #[test]
    fn test_effective_values_fall_back_to_defaults() {
        let config = GcsConfig::default().with_timeout(0);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert!(config.effective_user_agent().starts_with("bucketscope/"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: GcsConfig = serde_json::from_str(r#"{"http_timeout": 10}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http_timeout, 10);
    }
}
