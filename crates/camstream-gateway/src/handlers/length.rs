use async_trait::async_trait;

use camstream_core::error::Result;
use camstream_core::Frame;

use crate::dispatch::FrameHandler;

/// Logs the payload length of every frame.
#[derive(Default)]
pub struct LengthLogger;

impl LengthLogger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameHandler for LengthLogger {
    fn name(&self) -> &'static str {
        "length"
    }

    async fn handle(&self, frame: Frame) -> Result<()> {
        tracing::info!(connection = %frame.connection, seq = frame.seq, len = frame.len(), "frame received");
        Ok(())
    }
}
