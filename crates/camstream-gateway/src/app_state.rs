//! Shared application state for the camstream gateway.
//!
//! Wires config, frame policy, metrics, connection registry, and the frame
//! dispatcher (with its injected handler) into one cloneable handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use camstream_core::error::Result;
use camstream_core::ConnectionId;

use crate::config::GatewayConfig;
use crate::dispatch::{FrameDispatcher, FrameHandler};
use crate::handlers;
use crate::obs::GatewayMetrics;
use crate::policy::FramePolicy;
use crate::registry::ConnectionRegistry;

// Headroom over max_frame_bytes for base64 text envelopes (4/3 expansion plus JSON).
const TEXT_LANE_OVERHEAD_NUM: usize = 4;
const TEXT_LANE_OVERHEAD_DEN: usize = 3;
const ENVELOPE_SLACK_BYTES: usize = 4096;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    policy: FramePolicy,
    metrics: Arc<GatewayMetrics>,
    dispatcher: Arc<FrameDispatcher>,
    next_conn: AtomicU64,
    shutdown: CancellationToken,
}

impl AppState {
    /// Build state with the handler chain named in `frames.handlers`.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let handler = handlers::build_all(&cfg.frames.handlers);
        Self::with_handler(cfg, handler)
    }

    /// Build state around an explicit handler.
    pub fn with_handler(cfg: GatewayConfig, handler: Arc<dyn FrameHandler>) -> Result<Self> {
        cfg.validate()?;
        let policy = FramePolicy::new(&cfg.frames)?;

        let metrics = Arc::new(GatewayMetrics::default());
        let registry = Arc::new(ConnectionRegistry::new(
            cfg.frames.queue_capacity,
            Arc::clone(&metrics),
        ));
        let dispatcher = Arc::new(FrameDispatcher::new(registry, handler, Arc::clone(&metrics)));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                policy,
                metrics,
                dispatcher,
                next_conn: AtomicU64::new(1),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn policy(&self) -> &FramePolicy {
        &self.inner.policy
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn dispatcher(&self) -> Arc<FrameDispatcher> {
        Arc::clone(&self.inner.dispatcher)
    }

    /// Fresh id for an accepted socket (`conn-1`, `conn-2`, ...).
    pub fn next_connection_id(&self) -> ConnectionId {
        let n = self.inner.next_conn.fetch_add(1, Ordering::Relaxed);
        ConnectionId::from(format!("conn-{n}"))
    }

    /// Largest WebSocket message the transport accepts before the frame policy
    /// sees it.
    pub fn transport_message_limit(&self) -> usize {
        let max = self.inner.cfg.frames.max_frame_bytes;
        max.saturating_mul(TEXT_LANE_OVERHEAD_NUM) / TEXT_LANE_OVERHEAD_DEN + ENVELOPE_SLACK_BYTES
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Stop accepting sessions, close open ones, and deregister every
    /// connection. Workers finish the frames they already accepted.
    pub fn begin_shutdown(&self) {
        self.inner.metrics.set_draining();
        self.inner.shutdown.cancel();
        let n = self.inner.dispatcher.registry().disconnect_all();
        tracing::info!(connections = n, "gateway draining");
    }

    /// Gauges computed at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![(
            "camstream_registry_size",
            self.inner.dispatcher.registry().active_count() as u64,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn connection_ids_are_unique_and_ordered() {
        let state = AppState::new(config::load_from_str("version: 1\n").unwrap()).unwrap();
        assert_eq!(state.next_connection_id().as_str(), "conn-1");
        assert_eq!(state.next_connection_id().as_str(), "conn-2");
    }

    #[test]
    fn message_limit_covers_base64_expansion() {
        let cfg = config::load_from_str("version: 1\nframes:\n  max_frame_bytes: 3000\n").unwrap();
        let state = AppState::new(cfg).unwrap();
        assert_eq!(state.transport_message_limit(), 4000 + 4096);
    }

    #[tokio::test]
    async fn shutdown_drains_registry() {
        let state = AppState::new(config::load_from_str("version: 1\n").unwrap()).unwrap();
        let d = state.dispatcher();
        let _w = d.connect("a".into()).unwrap();
        assert_eq!(state.metrics_extra(), vec![("camstream_registry_size", 1)]);

        state.begin_shutdown();
        assert!(state.is_draining());
        assert!(state.shutdown_token().is_cancelled());
        assert!(!d.is_active(&"a".into()));
    }
}
