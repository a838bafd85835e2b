//! Connection registry: which connection ids are active, plus each
//! connection's ordered frame lane (sequence counter + bounded queue).

mod connection_registry;

pub use connection_registry::{ConnectionRegistry, ConnectionSlot, FrameQueue};
