//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Largest file the console will send to an upload endpoint (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Bearer token used to log in at startup, if any.
    pub token: Option<SecretString>,
    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ConsoleConfig {
    /// Load from `SALES_CONSOLE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = std::env::var("SALES_CONSOLE_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let token = std::env::var("SALES_CONSOLE_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from);

        let timeout_secs: u64 = std::env::var("SALES_CONSOLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout.as_secs());

        let config = Self {
            api_url,
            token,
            request_timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the HTTP client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "SALES_CONSOLE_API_URL".to_string(),
                message: format!("expected an http(s) URL, got {:?}", self.api_url),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SALES_CONSOLE_TIMEOUT_SECS".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Join an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConsoleConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let config = ConsoleConfig {
            api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ConsoleConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_joins_path() {
        let config = ConsoleConfig {
            api_url: "https://api.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/api/config"),
            "https://api.example.com/api/config"
        );
    }
}
