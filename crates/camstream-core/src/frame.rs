//! Connection identifiers and the frame unit handed to handlers.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// Opaque identifier of one client session, assigned at connect.
///
/// Backed by `Arc<str>` so it can be cloned into every frame and log span
/// without reallocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Arc<str>);

impl ConnectionId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// One received image frame.
///
/// `seq` starts at 0 for every connection and increases by one per accepted
/// frame. The payload is opaque (usually JPEG) and shared zero-copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub connection: ConnectionId,
    pub seq: u64,
    pub payload: Bytes,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
