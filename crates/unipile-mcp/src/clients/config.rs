//! Unipile connection configuration.
//!
//! Configuration is loaded from environment variables. The API key is always
//! required; the base URL is either given directly or derived from the DSN
//! parts (subdomain and port) shown in the Unipile dashboard.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Unipile API key.
pub const ENV_API_KEY: &str = "UNIPILE_API_KEY";
/// Environment variable holding a full base URL.
pub const ENV_BASE_URL: &str = "UNIPILE_BASE_URL";
/// Environment variable holding the DSN subdomain (e.g. `api8`).
pub const ENV_SUBDOMAIN: &str = "UNIPILE_SUBDOMAIN";
/// Environment variable holding the DSN port (e.g. `13851`).
pub const ENV_PORT: &str = "UNIPILE_PORT";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "UNIPILE_TIMEOUT_SECS";
/// Environment variable holding the total attempts for read requests,
/// including the first one (`1` disables retries).
pub const ENV_MAX_ATTEMPTS: &str = "UNIPILE_MAX_ATTEMPTS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Connection settings for the Unipile API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnipileConfig {
    /// Base URL, e.g. `https://api8.unipile.com:13851`.
    pub base_url: String,

    /// API key sent in the `X-API-KEY` header.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Total attempts for idempotent (GET) requests, first one included.
    pub max_attempts: u32,
}

impl UnipileConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default maximum attempts for read requests.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Create a configuration with default timeout and retry settings.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `UNIPILE_API_KEY`: API key (required)
    /// - `UNIPILE_BASE_URL`: full base URL
    /// - `UNIPILE_SUBDOMAIN` / `UNIPILE_PORT`: used when no base URL is set,
    ///   giving `https://{subdomain}.unipile.com:{port}`
    /// - `UNIPILE_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `UNIPILE_MAX_ATTEMPTS`: total attempts for read requests, `1`
    ///   disables retries (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or_else(|| ConfigError::MissingEnvVar(ENV_API_KEY.to_string()))?;

        let base_url = match get(ENV_BASE_URL) {
            Some(url) => url,
            None => {
                let subdomain = get(ENV_SUBDOMAIN)
                    .ok_or_else(|| ConfigError::MissingEnvVar(ENV_SUBDOMAIN.to_string()))?;
                let port = get(ENV_PORT)
                    .ok_or_else(|| ConfigError::MissingEnvVar(ENV_PORT.to_string()))?;
                dsn_base_url(&subdomain, &port)?
            }
        };

        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_number(ENV_TIMEOUT_SECS, &raw)?,
            None => Self::DEFAULT_TIMEOUT_SECS,
        };
        let max_attempts = match get(ENV_MAX_ATTEMPTS) {
            Some(raw) => parse_number(ENV_MAX_ATTEMPTS, &raw)?,
            None => Self::DEFAULT_MAX_ATTEMPTS,
        };

        let config = Self {
            base_url,
            api_key,
            timeout_secs,
            max_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar(ENV_API_KEY.to_string()));
        }
        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_BASE_URL.to_string(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_BASE_URL.to_string(),
                    message: e.to_string(),
                })
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_MAX_ATTEMPTS.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Build the base URL from the DSN parts.
pub fn dsn_base_url(subdomain: &str, port: &str) -> Result<String, ConfigError> {
    let subdomain = subdomain.trim();
    if subdomain.is_empty() || !subdomain.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::InvalidValue {
            key: ENV_SUBDOMAIN.to_string(),
            message: format!("'{}' is not a valid subdomain", subdomain),
        });
    }
    let port: u16 = parse_number(ENV_PORT, port)?;
    Ok(format!("https://{}.unipile.com:{}", subdomain, port))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
