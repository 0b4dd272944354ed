//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::ClearOutcome;

/// Response body for the clear endpoints
/// (`DELETE /cache`, `DELETE /cache/:namespace`, `POST /expired`)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Human-readable summary
    pub message: String,
    /// Namespace that was cleared, if the clear was scoped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Entries removed from the memory tier
    pub memory: usize,
    /// Entries removed from the persistent tier
    pub persistent: usize,
    /// Whether the external query cache was reset too
    pub query_cache_reset: bool,
}

impl ClearResponse {
    /// Creates a ClearResponse for a full clear
    pub fn all(outcome: ClearOutcome, query_cache_reset: bool) -> Self {
        Self {
            message: format!("Cleared {} cache entries", outcome.total()),
            namespace: None,
            memory: outcome.memory,
            persistent: outcome.persistent,
            query_cache_reset,
        }
    }

    /// Creates a ClearResponse for a namespace clear
    pub fn namespace(namespace: impl Into<String>, outcome: ClearOutcome) -> Self {
        let namespace = namespace.into();
        Self {
            message: format!(
                "Cleared {} entries from namespace '{}'",
                outcome.total(),
                namespace
            ),
            namespace: Some(namespace),
            memory: outcome.memory,
            persistent: outcome.persistent,
            query_cache_reset: false,
        }
    }

    /// Creates a ClearResponse for an expiry sweep
    pub fn expired(outcome: ClearOutcome) -> Self {
        Self {
            message: format!("Removed {} expired entries", outcome.total()),
            namespace: None,
            memory: outcome.memory,
            persistent: outcome.persistent,
            query_cache_reset: false,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
