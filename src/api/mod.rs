//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics surface.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics report
//! - `DELETE /cache` - Clear all cached data
//! - `DELETE /cache/:namespace` - Clear one namespace
//! - `POST /expired` - Sweep expired entries
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
