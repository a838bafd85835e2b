use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinHandle;

use camstream_core::error::Result;
use camstream_core::{ConnectionId, Frame};

use crate::dispatch::worker::{run_worker, WorkerReport};
use crate::obs::GatewayMetrics;
use crate::registry::ConnectionRegistry;

/// Pluggable consumer of frames (decode, display, store, analyse).
///
/// Called at most once at a time per connection, in sequence order. Returned
/// errors are logged by the dispatcher and never reach the transport.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;
    async fn handle(&self, frame: Frame) -> Result<()>;
}

/// Routes submitted payloads to per-connection workers.
pub struct FrameDispatcher {
    registry: Arc<ConnectionRegistry>,
    handler: Arc<dyn FrameHandler>,
    metrics: Arc<GatewayMetrics>,
}

impl FrameDispatcher {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        handler: Arc<dyn FrameHandler>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            handler,
            metrics,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }

    /// Register `id` and start its worker.
    ///
    /// The returned handle resolves once the worker has stopped, which is after
    /// disconnect and after every accepted frame was handled. Dropping it
    /// detaches the worker.
    pub fn connect(&self, id: ConnectionId) -> Result<JoinHandle<WorkerReport>> {
        let queue = self.registry.on_connect(id)?;
        let handler = Arc::clone(&self.handler);
        let metrics = Arc::clone(&self.metrics);
        Ok(tokio::spawn(run_worker(queue, handler, metrics)))
    }

    /// Deregister `id`. Frames already accepted by `submit` are still handled.
    pub fn disconnect(&self, id: &ConnectionId) -> Result<()> {
        self.registry.on_disconnect(id)
    }

    pub fn is_active(&self, id: &ConnectionId) -> bool {
        self.registry.is_active(id)
    }

    /// Hand a payload to `id`'s worker and return its sequence number.
    ///
    /// Waits while the connection's queue is full. A frame refused because
    /// the connection went away while waiting is counted as discarded.
    pub async fn submit(&self, id: &ConnectionId, payload: Bytes) -> Result<u64> {
        let slot = self.registry.get(id)?;
        match slot.enqueue(payload).await {
            Ok(seq) => {
                tracing::trace!(connection = %id, seq, "frame queued");
                Ok(seq)
            }
            Err(e) => {
                self.metrics.frames_discarded.inc(&[]);
                tracing::debug!(connection = %id, error = %e, "frame discarded on disconnect");
                Err(e)
            }
        }
    }
}
