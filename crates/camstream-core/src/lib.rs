//! camstream core: transport-agnostic frame primitives, wire envelopes, and
//! the shared error surface.
//!
//! The gateway, its frame handlers, and the test client all build on these
//! types. The crate carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input is
//! reported as `CamstreamError` so a bad client can never take the process
//! down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod frame;
pub mod protocol;

/// Shared result type.
pub use error::{CamstreamError, ClientCode, Result};
pub use frame::{ConnectionId, Frame};
