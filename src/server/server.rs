use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use super::library_routes::make_library_routes;
use super::metrics::metrics_handler;
use super::song_routes::make_song_routes;
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::library::{LibraryManager, SongManager};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    };
    Json(stats)
}

pub fn make_app(
    config: ServerConfig,
    song_manager: Arc<SongManager>,
    library_manager: Arc<LibraryManager>,
) -> Router {
    let state = ServerState::new(config, song_manager, library_manager);

    Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/song", make_song_routes(state.clone()))
        .nest("/library", make_library_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Serves the API on `port` and Prometheus metrics on `metrics_port` until
/// `shutdown` resolves.
pub async fn run_server(
    song_manager: Arc<SongManager>,
    library_manager: Arc<LibraryManager>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let config = ServerConfig {
        requests_logging_level,
        port,
        metrics_port,
    };
    let app = make_app(config, song_manager, library_manager);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    let metrics_server = tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed");

    metrics_server.abort();
    info!("HTTP server stopped");
    result
}
