//! Application configuration loaded from environment variables.
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! # Introspection Service
//!
//! - `OAUTH_BASE_URL`: Base URL of the OAuth service (default: `http://localhost:8082`)
//! - `OAUTH_TIMEOUT_MS`: Timeout for a single token lookup (default: 200)
//!
//! # Middleware Behavior
//!
//! - `AUTH_FAILURE_POLICY`: `reject` (default) answers failed validations with the
//!   error; `anonymous` lets the request through without identity

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, AppResult};
use crate::middleware::FailurePolicy;

/// Default base URL of the introspection service.
pub const DEFAULT_OAUTH_BASE_URL: &str = "http://localhost:8082";

/// Default timeout for a token lookup.
pub const DEFAULT_OAUTH_TIMEOUT: Duration = Duration::from_millis(200);

/// Outbound client settings for the token introspection service.
///
/// Built once and handed to [`crate::oauth::OAuthClient`]; nothing mutates it
/// afterwards, so several clients with different settings can coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Base URL, e.g. `http://oauth.internal:8082`
    pub base_url: String,
    /// Upper bound on the whole lookup (connect, send, read body)
    pub timeout: Duration,
}

impl OAuthSettings {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Parse and check the base URL.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the URL does not parse, is not http(s),
    /// or cannot carry path segments.
    pub fn parsed_base_url(&self) -> AppResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid OAUTH_BASE_URL '{}': {e}", self.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "OAUTH_BASE_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "OAUTH_BASE_URL '{}' cannot be used as a base URL",
                self.base_url
            )));
        }

        Ok(url)
    }

    fn validate(&self) -> AppResult<()> {
        self.parsed_base_url()?;

        if self.timeout.is_zero() {
            return Err(AppError::ConfigError(
                "OAUTH_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self::new(DEFAULT_OAUTH_BASE_URL, DEFAULT_OAUTH_TIMEOUT)
    }
}

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Introspection service client settings
    pub oauth: OAuthSettings,

    /// What the middleware does when validation fails (default: reject)
    pub auth_failure_policy: FailurePolicy,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value fails to parse or validate.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            oauth: OAuthSettings {
                base_url: env::var("OAUTH_BASE_URL")
                    .ok()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_OAUTH_BASE_URL.to_string()),
                timeout: Duration::from_millis(Self::parse_env(
                    "OAUTH_TIMEOUT_MS",
                    DEFAULT_OAUTH_TIMEOUT.as_millis() as u64,
                )?),
            },
            auth_failure_policy: Self::parse_env("AUTH_FAILURE_POLICY", FailurePolicy::Reject)?,

            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        self.oauth.validate()
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address, or `None` when metrics are disabled.
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        self.metrics_enabled()
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            oauth: OAuthSettings::default(),
            auth_failure_policy: FailurePolicy::Reject,
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.oauth.base_url, "http://localhost:8082");
        assert_eq!(config.oauth.timeout, Duration::from_millis(200));
        assert_eq!(config.auth_failure_policy, FailurePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_metrics_addr() {
        let config = Config::default();
        assert_eq!(config.metrics_addr().map(|a| a.port()), Some(9090));

        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };
        assert!(!config.metrics_enabled());
        assert!(config.metrics_addr().is_none());
    }

    #[test]
    fn test_validate_rejects_unparseable_base_url() {
        let config = Config {
            oauth: OAuthSettings::new("not a url", DEFAULT_OAUTH_TIMEOUT),
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OAUTH_BASE_URL"));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let settings = OAuthSettings::new("ftp://oauth.internal", DEFAULT_OAUTH_TIMEOUT);
        assert!(settings.validate().is_err());

        let settings = OAuthSettings::new("mailto:ops@example.com", DEFAULT_OAUTH_TIMEOUT);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let settings = OAuthSettings::new(DEFAULT_OAUTH_BASE_URL, Duration::ZERO);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("OAUTH_TIMEOUT_MS"));
    }

    #[test]
    fn test_parsed_base_url_keeps_path() {
        let settings = OAuthSettings::new("https://gateway.internal/auth", DEFAULT_OAUTH_TIMEOUT);
        let url = settings.parsed_base_url().unwrap();
        assert_eq!(url.path(), "/auth");
    }
}
