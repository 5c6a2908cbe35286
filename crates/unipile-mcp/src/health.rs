//! Health check of the Unipile connection.
//!
//! Backs the `unipile-mcp health` command, which is the quickest way to tell
//! a wrong API key or base URL apart from a problem inside an MCP client.
//!
//! ## Health Check Types
//!
//! - **Liveness**: Is the process running?
//! - **Readiness**: Does Unipile answer an authenticated request?
//! - **Deep**: Readiness plus latency and a short diagnosis.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unipile_mcp::clients::UnipileClient;
//! use unipile_mcp::health::{HealthCheckConfig, HealthChecker};
//!
//! async fn check_health() {
//!     let client = Arc::new(UnipileClient::from_env().unwrap());
//!     let checker = HealthChecker::new(client, HealthCheckConfig::default());
//!
//!     let health = checker.check_all().await;
//!     println!("Status: {:?}", health.status);
//!
//!     for service in &health.services {
//!         println!("  {}: {:?} ({}ms)",
//!             service.name, service.status, service.latency_ms);
//!     }
//! }
//! ```

use crate::clients::messaging::ListAccountsParams;
use crate::clients::{UnipileClient, UnipileError};
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All services healthy.
    Healthy,
    /// Some services degraded but functional.
    Degraded,
    /// Critical services unhealthy.
    Unhealthy,
}

/// Individual service health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy.
    Up,
    /// Service is degraded (slow responses).
    Degraded,
    /// Service is down.
    Down,
}

/// Health check result for a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Service name.
    pub name: String,

    /// Service status.
    pub status: ServiceStatus,

    /// Response latency in milliseconds.
    pub latency_ms: u64,

    /// Service URL.
    pub url: String,

    /// Error message if unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last successful check timestamp (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<String>,

    /// Number of linked accounts seen by the probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<usize>,
}

/// Aggregated health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,

    /// Timestamp of the check (ISO 8601).
    pub timestamp: String,

    /// Individual service health.
    pub services: Vec<ServiceHealth>,

    /// Total check duration in milliseconds.
    pub check_duration_ms: u64,

    /// Server version.
    pub version: String,

    /// Summary message.
    pub message: String,
}

impl HealthReport {
    /// Whether the process should exit successfully.
    pub fn is_ok(&self) -> bool {
        self.status != HealthStatus::Unhealthy
    }
}

/// Liveness check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResult {
    /// Is the service alive?
    pub alive: bool,

    /// Timestamp.
    pub timestamp: String,

    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// Readiness check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResult {
    /// Is the service ready?
    pub ready: bool,

    /// Timestamp.
    pub timestamp: String,

    /// Reason if not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Health check configuration.
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Timeout for the probe request.
    pub check_timeout: Duration,

    /// Latency threshold for degraded status (ms).
    pub degraded_threshold_ms: u64,

    /// Include detailed error messages.
    pub include_details: bool,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            degraded_threshold_ms: 1000,
            include_details: true,
        }
    }
}

/// Health checker for the Unipile API.
pub struct HealthChecker {
    /// Client used for probes; never retries.
    client: UnipileClient,

    /// Health check configuration.
    health_config: HealthCheckConfig,

    /// Start time for uptime calculation.
    start_time: Instant,
}

impl HealthChecker {
    /// Create a new health checker sharing the given client's connection pool.
    pub fn new(client: Arc<UnipileClient>, health_config: HealthCheckConfig) -> Self {
        Self {
            client: (*client).clone().with_retry(RetryConfig::no_retry()),
            health_config,
            start_time: Instant::now(),
        }
    }

    /// Quick liveness check.
    ///
    /// Returns immediately - just confirms the process is running.
    pub async fn check_liveness(&self) -> LivenessResult {
        LivenessResult {
            alive: true,
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Readiness check: one authenticated request must succeed.
    #[instrument(skip(self))]
    pub async fn check_readiness(&self) -> ReadinessResult {
        debug!("Performing readiness check");

        let reason = match self.probe().await {
            Ok(_) => None,
            Err(e) => Some(e),
        };

        ReadinessResult {
            ready: reason.is_none(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            reason,
        }
    }

    /// Full health check.
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        info!("Performing full health check");
        let start = Instant::now();

        let services = vec![self.check_unipile().await];
        let status = Self::aggregate_status(&services);
        let duration = start.elapsed();

        let message = match status {
            HealthStatus::Healthy => "Unipile API reachable".to_string(),
            HealthStatus::Degraded => format!(
                "Unipile API slow: responses above {}ms",
                self.health_config.degraded_threshold_ms
            ),
            HealthStatus::Unhealthy => {
                let errors: Vec<_> = services
                    .iter()
                    .filter_map(|s| s.error.as_deref())
                    .collect();
                format!("Unipile API unavailable: {}", errors.join("; "))
            }
        };

        info!(
            status = ?status,
            duration_ms = duration.as_millis() as u64,
            "Health check complete"
        );

        HealthReport {
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            services,
            check_duration_ms: duration.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION").to_string(),
            message,
        }
    }

    /// Probe Unipile and describe the result.
    async fn check_unipile(&self) -> ServiceHealth {
        let start = Instant::now();
        let result = self.probe().await;
        let latency = start.elapsed().as_millis() as u64;
        let url = self.client.base_url().to_string();

        match result {
            Ok(accounts) => {
                let status = if latency > self.health_config.degraded_threshold_ms {
                    warn!(
                        latency_ms = latency,
                        "Unipile response time exceeds threshold"
                    );
                    ServiceStatus::Degraded
                } else {
                    ServiceStatus::Up
                };

                ServiceHealth {
                    name: "Unipile".to_string(),
                    status,
                    latency_ms: latency,
                    url,
                    error: None,
                    last_success: Some(chrono::Utc::now().to_rfc3339()),
                    accounts,
                }
            }
            Err(e) => ServiceHealth {
                name: "Unipile".to_string(),
                status: ServiceStatus::Down,
                latency_ms: latency,
                url,
                error: Some(if self.health_config.include_details {
                    e
                } else {
                    "Unipile API unavailable".to_string()
                }),
                last_success: None,
                accounts: None,
            },
        }
    }

    /// List one account; returns the number of items seen.
    async fn probe(&self) -> Result<Option<usize>, String> {
        let params = ListAccountsParams {
            limit: Some(1),
            ..Default::default()
        };

        let response = tokio::time::timeout(
            self.health_config.check_timeout,
            self.client.list_all_accounts(&params),
        )
        .await
        .map_err(|_| {
            format!(
                "timed out after {}ms",
                self.health_config.check_timeout.as_millis()
            )
        })?;

        match response {
            Ok(body) => Ok(body
                .get("items")
                .and_then(|items| items.as_array())
                .map(|items| items.len())),
            Err(e) => {
                error!(error = %e, "Unipile health probe failed");
                Err(describe(&e))
            }
        }
    }

    /// Aggregate individual service statuses into overall status.
    fn aggregate_status(services: &[ServiceHealth]) -> HealthStatus {
        if services.iter().any(|s| s.status == ServiceStatus::Down) {
            HealthStatus::Unhealthy
        } else if services.iter().any(|s| s.status == ServiceStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

fn describe(error: &UnipileError) -> String {
    match error {
        UnipileError::AuthenticationFailed { status, .. } => {
            format!("API key rejected (HTTP {}); check UNIPILE_API_KEY", status)
        }
        UnipileError::NotFound { .. } => {
            "accounts endpoint not found; check UNIPILE_BASE_URL".to_string()
        }
        other => other.to_string(),
    }
}
