//! Shared error type across camstream crates.

use thiserror::Error;

use crate::frame::ConnectionId;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// Frame exceeds the configured size limit.
    PayloadTooLarge,
    /// Event name not accepted by policy.
    NotAllowed,
    /// Frame payload could not be decoded by a handler.
    MalformedFrame,
    /// Connection is not (or no longer) registered.
    UnknownConnection,
    /// Connection id is already registered.
    DuplicateConnection,
    /// No inbound traffic within the idle timeout.
    Timeout,
    /// Unsupported protocol or config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::MalformedFrame => "MALFORMED_FRAME",
            ClientCode::UnknownConnection => "UNKNOWN_CONNECTION",
            ClientCode::DuplicateConnection => "DUPLICATE_CONNECTION",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CamstreamError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum CamstreamError {
    #[error("connection already active: {0}")]
    DuplicateConnection(ConnectionId),
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("idle timeout")]
    IdleTimeout,
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl CamstreamError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CamstreamError::DuplicateConnection(_) => ClientCode::DuplicateConnection,
            CamstreamError::UnknownConnection(_) => ClientCode::UnknownConnection,
            CamstreamError::BadRequest(_) => ClientCode::BadRequest,
            CamstreamError::PayloadTooLarge { .. } => ClientCode::PayloadTooLarge,
            CamstreamError::NotAllowed(_) => ClientCode::NotAllowed,
            CamstreamError::MalformedFrame(_) => ClientCode::MalformedFrame,
            CamstreamError::IdleTimeout => ClientCode::Timeout,
            CamstreamError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            CamstreamError::Internal(_) => ClientCode::Internal,
        }
    }
}
