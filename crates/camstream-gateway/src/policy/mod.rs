//! Frame policy (size limit, text-lane event allowlist).
//!
//! Compiles the `frames` config section into lookup structures the transport
//! consults before a payload is submitted to the dispatcher.

pub mod allowlist;
pub mod engine;

pub use engine::{FramePolicy, PolicyDecision};
