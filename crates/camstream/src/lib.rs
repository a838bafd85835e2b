//! Top-level facade crate for camstream.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use camstream_core::*;
}

pub mod gateway {
    pub use camstream_gateway::*;
}
