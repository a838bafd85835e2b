//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that turns socket messages
//! into frame payloads before they reach the policy and dispatcher layers.

pub mod codec;
pub mod ws;
