//! Frame dispatcher and the handler trait it drives.
//!
//! Re-exports the dispatcher and `FrameHandler` so downstream consumers can
//! depend on this module directly.

pub mod dispatcher;
mod worker;

pub use dispatcher::{FrameDispatcher, FrameHandler};
pub use worker::WorkerReport;
