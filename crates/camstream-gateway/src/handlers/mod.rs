//! Built-in frame handlers.
//!
//! - `length`: log each frame's size.
//! - `jpeg`: decode each frame as JPEG and log its dimensions.
//!
//! Several handlers configured together run as a [`HandlerChain`].

mod chain;
mod jpeg;
mod length;

use std::sync::Arc;

pub use chain::HandlerChain;
pub use jpeg::{decode_jpeg, JpegDecodeHandler};
pub use length::LengthLogger;

use crate::config::HandlerKind;
use crate::dispatch::FrameHandler;

pub fn build(kind: HandlerKind) -> Arc<dyn FrameHandler> {
    match kind {
        HandlerKind::Length => Arc::new(LengthLogger::new()),
        HandlerKind::Jpeg => Arc::new(JpegDecodeHandler::new()),
    }
}

/// Build the configured handler set. A single entry is used as-is.
pub fn build_all(kinds: &[HandlerKind]) -> Arc<dyn FrameHandler> {
    match kinds {
        [single] => build(*single),
        many => Arc::new(HandlerChain::new(many.iter().map(|k| build(*k)).collect())),
    }
}
