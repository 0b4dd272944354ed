//! API Handlers
//!
//! HTTP request handlers for the cache diagnostics endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{clear_all_api_cache, CacheManager, CacheReport, QueryCache, StatsReporter};
use crate::error::Result;
use crate::models::{ClearResponse, HealthResponse};

/// Application state shared across all handlers.
///
/// The cache manager is internally synchronized, so it is shared by `Arc`
/// without an outer lock.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
    /// External query-result cache, reset alongside a full clear
    pub query_cache: Option<Arc<dyn QueryCache>>,
}

impl AppState {
    /// Creates a new AppState with the given cache manager.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self {
            cache,
            query_cache: None,
        }
    }

    /// Attaches the external query cache.
    pub fn with_query_cache(mut self, query_cache: Arc<dyn QueryCache>) -> Self {
        self.query_cache = Some(query_cache);
        self
    }
}

/// Handler for GET /stats
///
/// Returns per-tier entry counts, request counters and, when attached,
/// the query cache's counts.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheReport> {
    Json(StatsReporter::report(
        state.cache.as_ref(),
        state.query_cache.as_deref(),
    ))
}

/// Handler for DELETE /cache
///
/// Empties both tiers and resets the query cache if one is attached.
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let response = match state.query_cache.as_deref() {
        Some(query_cache) => {
            ClearResponse::all(clear_all_api_cache(state.cache.as_ref(), query_cache), true)
        }
        None => ClearResponse::all(state.cache.clear_all(), false),
    };
    Json(response)
}

/// Handler for DELETE /cache/:namespace
///
/// Removes every entry of one namespace from both tiers.
pub async fn clear_namespace_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ClearResponse>> {
    let outcome = state.cache.clear_namespace(&namespace)?;
    Ok(Json(ClearResponse::namespace(namespace, outcome)))
}

/// Handler for POST /expired
///
/// Runs an expiry sweep immediately.
pub async fn clear_expired_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse::expired(state.cache.clear_expired()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
