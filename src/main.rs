//! Keyloader demo server
//!
//! Serves a user directory through the batching loader: every HTTP request
//! gets its own scope, so repeated and concurrent lookups within a request
//! collapse into one directory call.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keyloader::api::create_router;
use keyloader::{spawn_cleanup_task, AppState, LoaderConfig, ServerConfig};

/// Main entry point for the demo server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load server and loader configuration from environment variables
/// 3. Build the user directory and scope manager
/// 4. Start the shared cache cleanup task when the shared region is enabled
/// 5. Serve the Axum router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyloader=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting keyloader demo server");

    let server = ServerConfig::from_env();
    let loader = LoaderConfig::from_env().context("invalid loader configuration")?;
    info!(
        port = server.server_port,
        directory_size = server.directory_size,
        directory_latency_ms = server.directory_latency_ms,
        max_batch_size = ?loader.max_batch_size,
        shared_cache = loader.shared_cache,
        "Configuration loaded"
    );

    let state = AppState::from_config(&server, loader).context("failed to build scope manager")?;

    let cleanup_handle = state.manager.shared_cache().map(|cache| {
        info!("Shared cache cleanup task started");
        spawn_cleanup_task(cache, Duration::from_secs(server.cleanup_interval.max(1)))
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the cleanup task.
async fn shutdown_signal(cleanup_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
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
                warn!(error = %err, "Failed to install SIGTERM handler");
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
