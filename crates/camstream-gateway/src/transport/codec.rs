//! Decode-once codec for the transport layer.
//!
//! - Binary messages => raw frame payload (no parsing)
//! - Text messages => `EventEnvelope` (payload decoded later, after policy)
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use bytes::Bytes;
use camstream_core::{error::Result, protocol::event};

#[derive(Debug)]
pub enum Inbound {
    Binary(Bytes),
    Event(event::EventEnvelope),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Binary(b) => Ok(Inbound::Binary(Bytes::from(b))),
        Message::Text(s) => Ok(Inbound::Event(event::decode_event(&s)?)),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

/// Raw size of a message as received.
pub fn message_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) | Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}
