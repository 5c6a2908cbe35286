//! Unipile API client.
//!
//! HTTP client for the Unipile REST API. This module holds the transport
//! plumbing shared by every endpoint: authentication headers, URL building,
//! retry of idempotent reads and translation of error responses. The
//! endpoint methods live in [`super::messaging`] and [`super::linkedin`].
//!
//! Response bodies are owned by Unipile and are returned as untyped JSON.

use super::config::{ConfigError, UnipileConfig};
use crate::retry::{with_retry_if, RetryConfig};
use crate::validate::ValidationError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Header carrying the Unipile API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Unipile client errors.
#[derive(Debug, Error)]
pub enum UnipileError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error body from the API.
        message: String,
    },

    /// The API key was rejected.
    #[error("Authentication failed ({status}): {message}")]
    AuthenticationFailed {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Error body from the API.
        message: String,
    },

    /// The requested resource does not exist.
    #[error("Not found: {path}: {message}")]
    NotFound {
        /// Request path.
        path: String,
        /// Error body from the API.
        message: String,
    },

    /// Too many requests.
    #[error("Rate limited by Unipile{}: {message}", retry_after_suffix(.retry_after_secs))]
    RateLimited {
        /// Seconds to wait, from the `Retry-After` header.
        retry_after_secs: Option<u64>,
        /// Error body from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Request parameters were rejected before sending.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Client configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn retry_after_suffix(secs: &Option<u64>) -> String {
    secs.map(|s| format!(" (retry after {}s)", s))
        .unwrap_or_default()
}

impl UnipileError {
    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UnipileError::ApiError { status, .. }
            | UnipileError::AuthenticationFailed { status, .. } => Some(*status),
            UnipileError::NotFound { .. } => Some(404),
            UnipileError::RateLimited { .. } => Some(429),
            UnipileError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether retrying the same read could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            UnipileError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            UnipileError::RateLimited { .. } => true,
            UnipileError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for Unipile client operations.
pub type UnipileResult<T> = Result<T, UnipileError>;

/// Unipile API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct UnipileClient {
    /// HTTP client instance with auth headers preset.
    client: Client,

    /// Parsed base URL.
    base_url: Url,

    /// Backoff applied to GET requests.
    retry: RetryConfig,
}

impl std::fmt::Debug for UnipileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnipileClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.retry.max_attempts)
            .finish()
    }
}

impl UnipileClient {
    /// Create a new client from configuration.
    pub fn new(config: &UnipileConfig) -> UnipileResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            message: e.to_string(),
        })?;

        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|e| ConfigError::InvalidValue {
                key: "api_key".to_string(),
                message: e.to_string(),
            })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .user_agent(concat!("unipile-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry: RetryConfig::with_max_attempts(config.max_attempts),
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> UnipileResult<Self> {
        let config = UnipileConfig::from_env()?;
        Self::new(&config)
    }

    /// Override the backoff used for GET requests.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL of the API.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an endpoint URL from path segments.
    ///
    /// Each segment is percent-encoded on its own, so identifiers containing
    /// `/` or `?` cannot change the endpoint being called.
    pub fn endpoint(&self, segments: &[&str]) -> UnipileResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidValue {
                key: "base_url".to_string(),
                message: format!("'{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET request, retrying transient failures.
    pub(crate) async fn get_json<Q>(
        &self,
        segments: &[&str],
        query: &Q,
    ) -> UnipileResult<serde_json::Value>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!(method = "GET", path = url.path(), "Calling Unipile");

        let body = with_retry_if(
            &self.retry,
            || self.execute(self.client.get(url.clone()).query(query)),
            UnipileError::is_retryable,
        )
        .await?;

        parse_json(&body)
    }

    /// Issue a POST request with a JSON body. Never retried.
    pub(crate) async fn post_json<Q, B>(
        &self,
        segments: &[&str],
        query: &Q,
        body: &B,
    ) -> UnipileResult<serde_json::Value>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!(method = "POST", path = url.path(), "Calling Unipile");

        let response = self
            .execute(self.client.post(url).query(query).json(body))
            .await?;
        parse_json(&response)
    }

    /// Issue a POST request whose success body may be empty or not JSON.
    ///
    /// Such responses are replaced by `{"status": <code>, "message": <fallback>}`.
    pub(crate) async fn post_json_lenient<B>(
        &self,
        segments: &[&str],
        body: &B,
        fallback_message: &str,
    ) -> UnipileResult<serde_json::Value>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!(method = "POST", path = url.path(), "Calling Unipile");

        let response = self.execute(self.client.post(url).json(body)).await?;
        match serde_json::from_str(&response.text) {
            Ok(value) => Ok(value),
            Err(_) => {
                debug!(
                    status = response.status.as_u16(),
                    "Non-JSON success body, returning acknowledgement"
                );
                Ok(serde_json::json!({
                    "status": response.status.as_u16(),
                    "message": fallback_message,
                }))
            }
        }
    }

    /// Send a request and map non-success statuses to errors.
    async fn execute(&self, request: RequestBuilder) -> UnipileResult<RawResponse> {
        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let text = response.text().await?;

        if status.is_success() {
            return Ok(RawResponse { status, text });
        }

        let message = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            text
        };

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(status = status.as_u16(), "Unipile authentication failed");
                UnipileError::AuthenticationFailed {
                    status: status.as_u16(),
                    message,
                }
            }
            StatusCode::NOT_FOUND => {
                warn!(path = %path, "Unipile resource not found");
                UnipileError::NotFound { path, message }
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(retry_after_secs = ?retry_after_secs, "Unipile rate limit hit");
                UnipileError::RateLimited {
                    retry_after_secs,
                    message,
                }
            }
            _ => {
                warn!("Unipile API error ({}): {}", status.as_u16(), message);
                UnipileError::ApiError {
                    status: status.as_u16(),
                    message,
                }
            }
        })
    }
}

/// Successful response before JSON decoding.
struct RawResponse {
    status: StatusCode,
    text: String,
}

fn parse_json(response: &RawResponse) -> UnipileResult<serde_json::Value> {
    serde_json::from_str(&response.text).map_err(|e| {
        UnipileError::InvalidResponse(format!(
            "expected JSON from Unipile (HTTP {}): {}",
            response.status.as_u16(),
            e
        ))
    })
}

/// Query string placeholder for endpoints without query parameters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub(crate) struct NoQuery {}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> UnipileClient {
        UnipileClient::new(&UnipileConfig::new(base_url, "test-key")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client("https://api8.unipile.com:13851");
        assert_eq!(client.base_url(), "https://api8.unipile.com:13851/");
        assert_eq!(client.retry.max_attempts, 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = UnipileClient::new(&UnipileConfig::new("not a url", "key"));
        assert!(matches!(result, Err(UnipileError::Config(_))));

        let result = UnipileClient::new(&UnipileConfig::new("https://example.com", "bad\nkey"));
        assert!(matches!(result, Err(UnipileError::Config(_))));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("https://api8.unipile.com:13851/");
        let url = client.endpoint(&["api", "v1", "chats", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://api8.unipile.com:13851/api/v1/chats/abc");
    }

    #[test]
    fn test_endpoint_encodes_identifiers() {
        let client = client("http://localhost:9000");
        let url = client.endpoint(&["api", "v1", "users", "a/b?c"]).unwrap();
        assert_eq!(url.path(), "/api/v1/users/a%2Fb%3Fc");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_error_classification() {
        let server_error = UnipileError::ApiError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(server_error.is_retryable());
        assert_eq!(server_error.status(), Some(503));

        let bad_request = UnipileError::ApiError {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(!bad_request.is_retryable());

        let limited = UnipileError::RateLimited {
            retry_after_secs: Some(3),
            message: "slow down".to_string(),
        };
        assert!(limited.is_retryable());
        assert!(limited.to_string().contains("retry after 3s"));

        let auth = UnipileError::AuthenticationFailed {
            status: 401,
            message: "bad key".to_string(),
        };
        assert!(!auth.is_retryable());
        assert_eq!(auth.status(), Some(401));
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        let raw = RawResponse {
            status: StatusCode::OK,
            text: "<html>".to_string(),
        };
        assert!(matches!(parse_json(&raw), Err(UnipileError::InvalidResponse(_))));
    }
}
