//! WebSocket session handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS (refused with 503 while draining)
//! - Assign a connection id and register it with the dispatcher
//! - Lifecycle: ping/pong, idle timeout, shutdown
//! - Size/event policy first, then submit the payload to the dispatcher
//!
//! The reader awaits `submit`, so a connection whose queue is full stops
//! being read until its worker catches up.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use camstream_core::error::{CamstreamError, Result};
use camstream_core::protocol::event::ServerEvent;
use camstream_core::ConnectionId;

use crate::app_state::AppState;
use crate::policy::PolicyDecision;
use crate::transport::codec::{decode, message_len, Inbound};

type WsSink = SplitSink<WebSocket, Message>;

const IDLE_CHECK_EVERY: Duration = Duration::from_millis(250);

enum Flow {
    Continue,
    Close,
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    let limit = app.transport_message_limit();
    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| async move {
            if let Err(e) = run_session(app, socket).await {
                tracing::warn!(error = %e, "session ended with error");
            }
        })
}

async fn run_session(app: AppState, socket: WebSocket) -> Result<()> {
    let id = app.next_connection_id();
    let dispatcher = app.dispatcher();

    // The worker detaches; after disconnect it drains the accepted frames and stops.
    let _worker = dispatcher.connect(id.clone())?;

    let span = tracing::info_span!("session", connection = %id);
    let res = session_loop(&app, &id, socket).instrument(span).await;

    // Shutdown may have deregistered us already.
    if let Err(e) = dispatcher.disconnect(&id) {
        tracing::debug!(connection = %id, error = %e, "disconnect after session end");
    }
    res
}

// --------------------
// Core session loop
// --------------------
async fn session_loop(app: &AppState, id: &ConnectionId, socket: WebSocket) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let shutdown = app.shutdown_token();

    let hello = ServerEvent::Connected { id: id.to_string() }.to_json();
    ws_tx
        .send(Message::Text(hello))
        .await
        .map_err(|e| CamstreamError::Internal(format!("send connected failed: {e}")))?;
    tracing::info!("session started");

    let gw = &app.cfg().gateway;
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval(Duration::from_millis(gw.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ping_tick.reset();

    let mut idle_tick = tokio::time::interval(IDLE_CHECK_EVERY);
    idle_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                tracing::info!("session closed by shutdown");
                break;
            }

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };

                match on_message(app, id, &mut ws_tx, msg).await {
                    Flow::Continue => {}
                    Flow::Close => break,
                }
                // submit may have waited on a full queue
                last_activity = Instant::now();
            }

            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            _ = idle_tick.tick() => {
                if last_activity.elapsed() >= idle_timeout {
                    let _ = reply_error(&mut ws_tx, &CamstreamError::IdleTimeout).await;
                    tracing::info!("session idle timeout");
                    break;
                }
            }
        }
    }

    tracing::info!("session ended");
    Ok(())
}

async fn on_message(app: &AppState, id: &ConnectionId, ws_tx: &mut WsSink, msg: Message) -> Flow {
    let metrics = app.metrics();
    let policy = app.policy();
    let raw_len = message_len(&msg);

    let inbound = match decode(msg) {
        Ok(i) => i,
        Err(e) => {
            metrics.frames_rejected.inc(&[("reason", "malformed")]);
            tracing::debug!(raw_len, error = %e, "undecodable message");
            return reply_error(ws_tx, &e).await;
        }
    };

    let (lane, payload) = match inbound {
        Inbound::Binary(payload) => ("binary", payload),
        Inbound::Event(env) => {
            if let Some(flow) = enforce(ws_tx, app, policy.check_event(&env.event), "event").await {
                return flow;
            }
            match env.payload() {
                Ok(p) => ("text", p),
                Err(e) => {
                    metrics.frames_rejected.inc(&[("reason", "malformed")]);
                    return reply_error(ws_tx, &e).await;
                }
            }
        }
        Inbound::Ping(v) => {
            return match ws_tx.send(Message::Pong(v)).await {
                Ok(()) => Flow::Continue,
                Err(_) => Flow::Close,
            };
        }
        Inbound::Pong(_) => return Flow::Continue,
        Inbound::Close => return Flow::Close,
    };

    if let Some(flow) = enforce(ws_tx, app, policy.check_len(payload.len()), "oversize").await {
        return flow;
    }

    submit(app, id, lane, payload).await
}

async fn submit(app: &AppState, id: &ConnectionId, lane: &'static str, payload: Bytes) -> Flow {
    let len = payload.len();
    match app.dispatcher().submit(id, payload).await {
        Ok(seq) => {
            app.metrics().frames_received.inc(&[("lane", lane)]);
            tracing::debug!(seq, len, lane, "frame accepted");
            Flow::Continue
        }
        Err(e) => {
            tracing::info!(error = %e, "submit failed; closing session");
            Flow::Close
        }
    }
}

/// Apply a policy decision. `None` means the message may proceed.
async fn enforce(
    ws_tx: &mut WsSink,
    app: &AppState,
    decision: PolicyDecision,
    reason: &'static str,
) -> Option<Flow> {
    match decision {
        PolicyDecision::Pass => None,
        PolicyDecision::Reject(e) => {
            app.metrics().frames_rejected.inc(&[("reason", reason)]);
            tracing::debug!(error = %e, "message rejected");
            Some(reply_error(ws_tx, &e).await)
        }
        PolicyDecision::Close(e) => {
            app.metrics().frames_rejected.inc(&[("reason", reason)]);
            tracing::info!(error = %e, "closing session on policy");
            let _ = reply_error(ws_tx, &e).await;
            Some(Flow::Close)
        }
    }
}

async fn reply_error(ws_tx: &mut WsSink, err: &CamstreamError) -> Flow {
    let msg = Message::Text(ServerEvent::error(err).to_json());
    match ws_tx.send(msg).await {
        Ok(()) => Flow::Continue,
        Err(_) => Flow::Close,
    }
}
