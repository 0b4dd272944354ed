//! Error types for the portal cache
//!
//! Provides unified error handling using thiserror.
//!
//! Only [`CacheError`] ever crosses the cache manager's public boundary.
//! [`StorageError`] is raised by storage media and absorbed by the
//! persistent tier.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors surfaced to callers of the cache manager.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Namespace or logical key cannot form a valid cache key
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Params could not be serialized into a key
    #[error("Failed to serialize cache key params: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Storage Error Enum ==
/// Faults raised by a persistent storage medium.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Write would exceed the medium's byte quota
    #[error("Storage quota exceeded: need {needed} bytes, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Medium cannot be used in the current context
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
