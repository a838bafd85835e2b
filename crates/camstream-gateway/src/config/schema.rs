use serde::Deserialize;
use camstream_core::error::{CamstreamError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub frames: FramesSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CamstreamError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.frames.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(CamstreamError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(CamstreamError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(CamstreamError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:9000".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}

/// What to do with a frame larger than `max_frame_bytes`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnOversize {
    /// Reply with an error and drop the frame.
    #[default]
    Reject,
    /// Reply with an error and close the connection.
    Close,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Length,
    Jpeg,
}

pub const MAX_FRAME_BYTES_CEILING: usize = 64 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FramesSection {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Per-connection queue depth. Senders wait once it is full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub on_oversize: OnOversize,

    /// Text-lane event names accepted as frames (`*` = any).
    #[serde(default = "default_events")]
    pub events: Vec<String>,

    #[serde(default = "default_handlers")]
    pub handlers: Vec<HandlerKind>,
}

impl Default for FramesSection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            queue_capacity: default_queue_capacity(),
            on_oversize: OnOversize::default(),
            events: default_events(),
            handlers: default_handlers(),
        }
    }
}

impl FramesSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FRAME_BYTES_CEILING).contains(&self.max_frame_bytes) {
            return Err(CamstreamError::BadRequest(format!(
                "frames.max_frame_bytes must be between 1 and {MAX_FRAME_BYTES_CEILING}"
            )));
        }
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(CamstreamError::BadRequest(
                "frames.queue_capacity must be between 1 and 65536".into(),
            ));
        }
        if self.events.is_empty() || self.events.iter().any(|e| e.trim().is_empty()) {
            return Err(CamstreamError::BadRequest(
                "frames.events must be non-empty and contain no blank names".into(),
            ));
        }
        if self.handlers.is_empty() {
            return Err(CamstreamError::BadRequest("frames.handlers must not be empty".into()));
        }
        Ok(())
    }
}

fn default_max_frame_bytes() -> usize {
    4 * 1024 * 1024
}
fn default_queue_capacity() -> usize {
    256
}
fn default_events() -> Vec<String> {
    vec!["receiveImage".into(), "newImage".into(), "sendPicture".into()]
}
fn default_handlers() -> Vec<HandlerKind> {
    vec![HandlerKind::Length]
}
