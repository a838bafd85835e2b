//! camstream gateway
//!
//! - WebSocket endpoint: /v1/ws (binary frames or base64 text events)
//! - Per-connection ordered frame workers with bounded queues
//! - Ops: /healthz, /readyz, /metrics
//! - Ctrl-C drains: readiness flips, sessions close, queued frames are dropped

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use camstream_core::error::{CamstreamError, Result};
use camstream_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "camstream-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        CamstreamError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        handler = state.dispatcher().handler_name(),
        queue_capacity = state.cfg().frames.queue_capacity,
        max_frame_bytes = state.cfg().frames.max_frame_bytes,
        "camstream-gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| CamstreamError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| CamstreamError::Internal(format!("server failed: {e}")))?;

    tracing::info!("camstream-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    state.begin_shutdown();
}
