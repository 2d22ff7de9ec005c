//! HTTP surface of the relay.
//!
//! `POST /puppet-data` ingests a (possibly partial) frame from the producer.
//! `GET /puppet-data` returns the current output frame.
//! `GET /static/*` serves the consumer client from disk.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use vpupper_common::config::ServerConfig;
use vpupper_common::error::{VpupperError, VpupperResult};
use vpupper_processing_core::PuppetRelay;
use vpupper_puppet_model::{FramePatch, PuppetFrame};

async fn update_puppet_data(
    State(relay): State<Arc<PuppetRelay>>,
    Json(patch): Json<FramePatch>,
) -> Json<&'static str> {
    relay.ingest(patch);
    Json("ok")
}

async fn fetch_puppet_data(State(relay): State<Arc<PuppetRelay>>) -> Json<PuppetFrame> {
    tracing::debug!(frames_received = relay.frames_received(), "Fetching smoothed puppet data");
    let frame = relay.current();
    Json((*frame).clone())
}

/// Routes for the relay, plus the static client under `/static`.
pub fn router(relay: Arc<PuppetRelay>, static_dir: &Path) -> Router {
    Router::new()
        .route(
            "/puppet-data",
            get(fetch_puppet_data).post(update_puppet_data),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(relay)
}

/// Bind `bind_address:port` and serve until Ctrl+C.
pub async fn serve(config: &ServerConfig, port: u16, relay: Arc<PuppetRelay>) -> VpupperResult<()> {
    let bind_address = config.bind_address.as_str();
    if !config.static_dir.is_dir() {
        tracing::warn!(dir = %config.static_dir.display(), "Static directory missing; /static will return 404");
    }

    let listener = TcpListener::bind((bind_address, port))
        .await
        .map_err(|e| VpupperError::server(format!("failed to bind {bind_address}:{port}: {e}")))?;
    let local = listener.local_addr()?;
    tracing::info!(address = %local, "VPupper server running on port {}", local.port());

    axum::serve(listener, router(relay, &config.static_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("VPupper server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
}
