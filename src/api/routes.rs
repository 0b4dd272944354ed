//! API Routes
//!
//! Configures the Axum router with the cache diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_expired_handler, clear_namespace_handler, health_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /stats` - Cache statistics report
/// - `DELETE /cache` - Clear every namespace (and the query cache)
/// - `DELETE /cache/:namespace` - Clear one namespace
/// - `POST /expired` - Sweep expired entries now
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, for the diagnostics UI
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_all_handler))
        .route("/expired", post(clear_expired_handler))
        .route("/cache/:namespace", delete(clear_namespace_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
