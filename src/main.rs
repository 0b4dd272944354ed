//! Portal Cache - diagnostics server
//!
//! Opens the persistent store, builds the cache manager, runs the expiry
//! sweeper and serves the diagnostics API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_cache::api::{create_router, AppState};
use portal_cache::cache::CacheManager;
use portal_cache::config::Config;
use portal_cache::storage::FileKvStore;
use portal_cache::tasks::Sweeper;

/// Main entry point for the portal cache diagnostics server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the persistent store and build the cache manager
/// 4. Start the background expiry sweeper
/// 5. Serve the diagnostics router on the configured port
/// 6. Stop the sweeper on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portal Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: prefix={}, storage={}, sweep_interval={}s, port={}",
        config.key_prefix,
        config.storage_path.display(),
        config.sweep_interval,
        config.server_port
    );

    // A broken store degrades to an empty one rather than blocking startup.
    let store = FileKvStore::open_or_recover(&config.storage_path, config.storage_quota);
    let cache: Arc<CacheManager> =
        Arc::new(CacheManager::new(config.key_prefix.clone(), Arc::new(store)));
    let stats = cache.get_stats();
    info!(
        "Cache manager initialized with {} persisted entries",
        stats.persistent.entries
    );

    let sweeper = Sweeper::new(config.sweep_interval());
    sweeper.start(cache.clone());

    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("serving diagnostics API")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeper.
async fn shutdown_signal(sweeper: Sweeper) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper.stop();
}
