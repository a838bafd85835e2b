use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;

use camstream_core::error::{CamstreamError, Result};
use camstream_core::{ConnectionId, Frame};

use crate::obs::GatewayMetrics;

/// Sender half of a connection's lane. Sequence assignment and enqueue happen
/// under one lock so queue order always equals sequence order.
struct Lane {
    next_seq: u64,
    tx: mpsc::Sender<Frame>,
}

/// One active connection.
pub struct ConnectionSlot {
    id: ConnectionId,
    lane: AsyncMutex<Lane>,
    cancel: CancellationToken,
}

impl ConnectionSlot {
    /// Assign the next sequence number and enqueue the frame.
    ///
    /// Waits while the queue is full. Fails with `UnknownConnection` if the
    /// connection is torn down before or while waiting; the sequence number is
    /// consumed only when the frame was actually enqueued, and an enqueued
    /// frame is always delivered.
    pub async fn enqueue(&self, payload: Bytes) -> Result<u64> {
        let mut lane = self.lane.lock().await;
        if self.cancel.is_cancelled() {
            return Err(CamstreamError::UnknownConnection(self.id.clone()));
        }

        let seq = lane.next_seq;
        let frame = Frame {
            connection: self.id.clone(),
            seq,
            payload,
        };

        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            r = lane.tx.send(frame) => r.is_ok(),
        };
        if !sent {
            return Err(CamstreamError::UnknownConnection(self.id.clone()));
        }

        lane.next_seq += 1;
        Ok(seq)
    }
}

/// Receiving half of a connection's lane, consumed by exactly one worker.
pub struct FrameQueue {
    pub id: ConnectionId,
    pub rx: mpsc::Receiver<Frame>,
    pub cancel: CancellationToken,
}

/// Tracks active connections.
///
/// A single mutex guards the id map; it is held only for insert, lookup, and
/// remove, never across an `.await`.
pub struct ConnectionRegistry {
    slots: Mutex<HashMap<ConnectionId, Arc<ConnectionSlot>>>,
    queue_capacity: usize,
    metrics: Arc<GatewayMetrics>,
}

impl ConnectionRegistry {
    pub fn new(queue_capacity: usize, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
            metrics,
        }
    }

    // Nothing panics while the map lock is held, so a poisoned lock still
    // guards a consistent map.
    fn slots(&self) -> MutexGuard<'_, HashMap<ConnectionId, Arc<ConnectionSlot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new active connection and hand back its frame queue.
    pub fn on_connect(&self, id: ConnectionId) -> Result<FrameQueue> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let cancel = CancellationToken::new();

        {
            let mut slots = self.slots();
            if slots.contains_key(&id) {
                return Err(CamstreamError::DuplicateConnection(id));
            }
            slots.insert(
                id.clone(),
                Arc::new(ConnectionSlot {
                    id: id.clone(),
                    lane: AsyncMutex::new(Lane { next_seq: 0, tx }),
                    cancel: cancel.clone(),
                }),
            );
        }

        self.metrics.connections_total.inc(&[]);
        self.metrics.connections_active.inc(&[]);
        tracing::info!(connection = %id, "connection registered");

        Ok(FrameQueue { id, rx, cancel })
    }

    /// Deregister a connection and close its lane. Submits still waiting for
    /// queue capacity fail; frames already queued are delivered by the worker
    /// before it stops.
    pub fn on_disconnect(&self, id: &ConnectionId) -> Result<()> {
        let slot = self
            .slots()
            .remove(id)
            .ok_or_else(|| CamstreamError::UnknownConnection(id.clone()))?;

        slot.cancel.cancel();

        self.metrics.connections_active.dec(&[]);
        tracing::info!(connection = %id, "connection deregistered");
        Ok(())
    }

    pub fn is_active(&self, id: &ConnectionId) -> bool {
        self.slots().contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.slots().len()
    }

    /// Look up an active connection.
    pub fn get(&self, id: &ConnectionId) -> Result<Arc<ConnectionSlot>> {
        self.slots()
            .get(id)
            .cloned()
            .ok_or_else(|| CamstreamError::UnknownConnection(id.clone()))
    }

    /// Deregister every connection (shutdown path). Returns how many were active.
    pub fn disconnect_all(&self) -> usize {
        let drained: Vec<_> = self.slots().drain().collect();
        for (id, slot) in &drained {
            slot.cancel.cancel();
            self.metrics.connections_active.dec(&[]);
            tracing::info!(connection = %id, "connection deregistered (shutdown)");
        }
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(cap: usize) -> ConnectionRegistry {
        ConnectionRegistry::new(cap, Arc::new(GatewayMetrics::default()))
    }

    #[test]
    fn connect_disconnect_lifecycle() {
        let reg = registry(4);
        let a = ConnectionId::from("a");

        assert!(!reg.is_active(&a));
        let _q = reg.on_connect(a.clone()).unwrap();
        assert!(reg.is_active(&a));
        assert_eq!(reg.active_count(), 1);

        reg.on_disconnect(&a).unwrap();
        assert!(!reg.is_active(&a));
        assert_eq!(reg.metrics.connections_active.get(&[]), 0);
        assert_eq!(reg.metrics.connections_total.get(&[]), 1);
    }

    #[test]
    fn duplicate_connect_is_rejected() {
        let reg = registry(4);
        let _q = reg.on_connect("a".into()).unwrap();
        let err = reg.on_connect("a".into()).err().unwrap();
        assert!(matches!(err, CamstreamError::DuplicateConnection(ref id) if id.as_str() == "a"));
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn disconnect_unknown_is_rejected() {
        let reg = registry(4);
        let err = reg.on_disconnect(&"ghost".into()).unwrap_err();
        assert!(matches!(err, CamstreamError::UnknownConnection(_)));
    }

    #[test]
    fn disconnect_cancels_queue_token() {
        let reg = registry(4);
        let q = reg.on_connect("a".into()).unwrap();
        assert!(!q.cancel.is_cancelled());
        reg.on_disconnect(&"a".into()).unwrap();
        assert!(q.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn reconnect_after_disconnect_restarts_sequence() {
        let reg = registry(4);
        let a = ConnectionId::from("a");

        let _q1 = reg.on_connect(a.clone()).unwrap();
        let slot = reg.get(&a).unwrap();
        assert_eq!(slot.enqueue(Bytes::from_static(b"x")).await.unwrap(), 0);
        assert_eq!(slot.enqueue(Bytes::from_static(b"y")).await.unwrap(), 1);
        reg.on_disconnect(&a).unwrap();

        let mut q2 = reg.on_connect(a.clone()).unwrap();
        let slot = reg.get(&a).unwrap();
        assert_eq!(slot.enqueue(Bytes::from_static(b"z")).await.unwrap(), 0);
        let f = q2.rx.recv().await.unwrap();
        assert_eq!(f.seq, 0);
        assert_eq!(f.payload, Bytes::from_static(b"z"));
    }

    #[tokio::test]
    async fn enqueue_on_torn_down_slot_fails() {
        let reg = registry(4);
        let _q = reg.on_connect("a".into()).unwrap();
        let slot = reg.get(&"a".into()).unwrap();
        reg.on_disconnect(&"a".into()).unwrap();

        let err = slot.enqueue(Bytes::from_static(b"late")).await.unwrap_err();
        assert!(matches!(err, CamstreamError::UnknownConnection(_)));
    }

    #[test]
    fn disconnect_all_clears_registry() {
        let reg = registry(4);
        let _a = reg.on_connect("a".into()).unwrap();
        let _b = reg.on_connect("b".into()).unwrap();
        assert_eq!(reg.disconnect_all(), 2);
        assert_eq!(reg.active_count(), 0);
        assert_eq!(reg.metrics.connections_active.get(&[]), 0);
    }
}
