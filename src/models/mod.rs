//! Response models for the diagnostics API
//!
//! This module defines the DTOs serialized into HTTP response bodies.
//! Statistics are served as [`crate::cache::CacheReport`] directly.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, ErrorResponse, HealthResponse};
