//! Per-connection worker: drains one connection's queue strictly in order.
//!
//! On disconnect the queue is closed rather than dropped: frames whose
//! `submit` already returned a sequence number are still delivered, and only
//! senders that never got a slot are refused.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use crate::dispatch::FrameHandler;
use crate::obs::GatewayMetrics;
use crate::registry::FrameQueue;

/// What a worker did over its lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    /// Frames passed to the handler (including failed ones).
    pub handled: u64,
    /// Handler calls that returned an error or panicked.
    pub failed: u64,
}

pub(crate) async fn run_worker(
    queue: FrameQueue,
    handler: Arc<dyn FrameHandler>,
    metrics: Arc<GatewayMetrics>,
) -> WorkerReport {
    let FrameQueue { id, mut rx, cancel } = queue;
    let name = handler.name();
    let mut report = WorkerReport::default();
    let mut closed = false;

    loop {
        let frame = tokio::select! {
            biased;
            next = rx.recv() => match next {
                Some(f) => f,
                None => break,
            },
            _ = cancel.cancelled(), if !closed => {
                // buffered frames stay receivable; recv yields None once they are gone
                rx.close();
                closed = true;
                continue;
            }
        };

        let seq = frame.seq;
        let len = frame.len();
        let started = Instant::now();
        let outcome = AssertUnwindSafe(handler.handle(frame)).catch_unwind().await;
        metrics
            .handle_duration
            .observe(&[("handler", name)], started.elapsed());
        report.handled += 1;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                report.failed += 1;
                metrics
                    .handler_errors
                    .inc(&[("handler", name), ("kind", "error")]);
                tracing::warn!(connection = %id, seq, len, handler = name, error = %e, "frame handler failed");
            }
            Err(_) => {
                report.failed += 1;
                metrics
                    .handler_errors
                    .inc(&[("handler", name), ("kind", "panic")]);
                tracing::error!(connection = %id, seq, len, handler = name, "frame handler panicked");
            }
        }
    }

    tracing::debug!(
        connection = %id,
        handled = report.handled,
        failed = report.failed,
        "frame worker stopped"
    );
    report
}
