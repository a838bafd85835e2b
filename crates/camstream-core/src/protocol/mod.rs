//! Wire formats.
//!
//! Binary WebSocket messages carry a raw frame payload and need no parsing.
//! Text messages carry a JSON [`event::EventEnvelope`] whose `data` holds the
//! payload as base64 (or plain UTF-8), plus the server's own lifecycle
//! notifications ([`event::ServerEvent`]).
//!
//! All parsers are panic-free: malformed input is reported as
//! `CamstreamError`.

pub mod event;
