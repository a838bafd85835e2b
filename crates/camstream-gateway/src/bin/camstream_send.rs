//! camstream-send: push one test frame to a running gateway.
//!
//! Sends a file (or a short test string) either as a binary message or as a
//! text event envelope, waits briefly for an error reply, then disconnects.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing_subscriber::{fmt, EnvFilter};

use camstream_core::error::{CamstreamError, Result};
use camstream_core::protocol::event::{EventEnvelope, ServerEvent};

#[derive(Debug, Parser)]
#[command(name = "camstream-send", about = "Send a single frame to a camstream gateway")]
struct Args {
    /// Gateway WebSocket URL.
    #[arg(long, default_value = "ws://127.0.0.1:9000/v1/ws")]
    url: String,

    /// File to send (e.g. a JPEG). Without it a test string is sent.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Send as a text event envelope instead of a binary message.
    #[arg(long)]
    text: bool,

    /// Event name used with --text.
    #[arg(long, default_value = "receiveImage")]
    event: String,

    /// How long to wait for a server reply after sending.
    #[arg(long, default_value_t = 500)]
    wait_ms: u64,
}

const TEST_PAYLOAD: &[u8] = b"testing sending images";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "send failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let payload = match &args.file {
        Some(path) => tokio::fs::read(path).await.map_err(|e| {
            CamstreamError::BadRequest(format!("read {} failed: {e}", path.display()))
        })?,
        None => TEST_PAYLOAD.to_vec(),
    };

    let (mut ws, _) = connect_async(args.url.as_str())
        .await
        .map_err(|e| CamstreamError::Internal(format!("connect {} failed: {e}", args.url)))?;

    // The gateway greets with the assigned connection id.
    if let Some(Ok(Message::Text(hello))) = ws.next().await {
        match serde_json::from_str::<ServerEvent>(&hello) {
            Ok(ServerEvent::Connected { id }) => tracing::info!(%id, "connected"),
            _ => tracing::warn!(%hello, "unexpected greeting"),
        }
    }

    let msg = if args.text {
        Message::Text(EventEnvelope::new(args.event.as_str(), &payload).to_json()?)
    } else {
        Message::Binary(payload.clone())
    };
    ws.send(msg)
        .await
        .map_err(|e| CamstreamError::Internal(format!("send failed: {e}")))?;
    tracing::info!(len = payload.len(), text = args.text, "frame sent");

    // Only error replies are expected; silence means the frame was accepted.
    let wait = Duration::from_millis(args.wait_ms);
    if let Ok(Some(Ok(Message::Text(reply)))) = tokio::time::timeout(wait, ws.next()).await {
        tracing::warn!(%reply, "gateway replied");
    }

    ws.close(None)
        .await
        .map_err(|e| CamstreamError::Internal(format!("close failed: {e}")))?;
    tracing::info!("disconnected");
    Ok(())
}
