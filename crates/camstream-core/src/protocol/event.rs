//! Text-lane event envelope (JSON).
//!
//! Inbound: `{"event": "receiveImage", "data": "<base64>"}`. The optional
//! `encoding` field selects how `data` maps to payload bytes.
//!
//! Outbound: `{"event": "connected", "data": {...}}` and
//! `{"event": "error", "data": {"code": ..., "msg": ...}}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CamstreamError, Result};

/// How the `data` string of an envelope encodes the frame payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    #[default]
    Base64,
    /// The string's UTF-8 bytes are the payload.
    Utf8,
}

/// Inbound text-lane envelope carrying one frame.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventEnvelope {
    /// Event name (e.g. `receiveImage`).
    pub event: String,
    /// Encoded payload.
    pub data: String,
    #[serde(default, skip_serializing_if = "is_base64")]
    pub encoding: PayloadEncoding,
}

fn is_base64(e: &PayloadEncoding) -> bool {
    *e == PayloadEncoding::Base64
}

impl EventEnvelope {
    /// Build a base64 envelope for `payload`.
    pub fn new(event: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            event: event.into(),
            data: STANDARD.encode(payload),
            encoding: PayloadEncoding::Base64,
        }
    }

    /// Build an envelope carrying a plain UTF-8 payload.
    pub fn utf8(event: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: text.into(),
            encoding: PayloadEncoding::Utf8,
        }
    }

    /// Decode `data` into the raw frame payload.
    pub fn payload(&self) -> Result<Bytes> {
        match self.encoding {
            PayloadEncoding::Base64 => STANDARD
                .decode(self.data.as_bytes())
                .map(Bytes::from)
                .map_err(|e| CamstreamError::BadRequest(format!("invalid base64 data: {e}"))),
            PayloadEncoding::Utf8 => Ok(Bytes::copy_from_slice(self.data.as_bytes())),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CamstreamError::Internal(format!("envelope encode failed: {e}")))
    }
}

/// Parse an inbound text message.
pub fn decode_event(text: &str) -> Result<EventEnvelope> {
    serde_json::from_str(text)
        .map_err(|e| CamstreamError::BadRequest(format!("invalid event json: {e}")))
}

/// Server-to-client notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once after upgrade with the assigned connection id.
    Connected { id: String },
    /// A message was rejected; the connection may or may not stay open.
    Error { code: String, msg: String },
}

impl ServerEvent {
    pub fn error(err: &CamstreamError) -> Self {
        ServerEvent::Error {
            code: err.client_code().as_str().to_string(),
            msg: err.to_string(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"event":"error","data":{"code":"INTERNAL","msg":"encode failed"}}"#.to_string()
        })
    }
}
