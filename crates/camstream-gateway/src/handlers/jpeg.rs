use async_trait::async_trait;
use image::ImageFormat;

use camstream_core::error::{CamstreamError, Result};
use camstream_core::Frame;

use crate::dispatch::FrameHandler;

/// Decode a JPEG payload and return its `(width, height)`.
pub fn decode_jpeg(payload: &[u8]) -> Result<(u32, u32)> {
    let img = image::load_from_memory_with_format(payload, ImageFormat::Jpeg)
        .map_err(|e| CamstreamError::MalformedFrame(format!("jpeg decode failed: {e}")))?;
    Ok((img.width(), img.height()))
}

/// Fully decodes each frame as JPEG. Decoding runs on the blocking pool so
/// large frames do not stall the runtime.
#[derive(Default)]
pub struct JpegDecodeHandler;

impl JpegDecodeHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameHandler for JpegDecodeHandler {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    async fn handle(&self, frame: Frame) -> Result<()> {
        let payload = frame.payload.clone();
        let (width, height) = tokio::task::spawn_blocking(move || decode_jpeg(&payload))
            .await
            .map_err(|e| CamstreamError::Internal(format!("jpeg decode task failed: {e}")))??;

        tracing::info!(
            connection = %frame.connection,
            seq = frame.seq,
            width,
            height,
            "frame decoded"
        );
        Ok(())
    }
}
