//! camstream gateway library entry.
//!
//! Wires the WebSocket transport, frame policy, connection registry, frame
//! dispatcher, and built-in frame handlers into one server. Consumed by the
//! binaries and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod registry;
pub mod router;
pub mod transport;
