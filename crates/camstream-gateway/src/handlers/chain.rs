use std::sync::Arc;

use async_trait::async_trait;

use camstream_core::error::Result;
use camstream_core::Frame;

use crate::dispatch::FrameHandler;

/// Runs handlers in order on every frame. The first error ends the chain for
/// that frame.
pub struct HandlerChain {
    handlers: Vec<Arc<dyn FrameHandler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Arc<dyn FrameHandler>>) -> Self {
        Self { handlers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

#[async_trait]
impl FrameHandler for HandlerChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn handle(&self, frame: Frame) -> Result<()> {
        for h in &self.handlers {
            // Bytes clones share the buffer.
            h.handle(frame.clone()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use camstream_core::CamstreamError;

    use super::*;

    struct Tag {
        name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl FrameHandler for Tag {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, _frame: Frame) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(CamstreamError::MalformedFrame(self.name.into()));
            }
            Ok(())
        }
    }

    fn frame() -> Frame {
        Frame {
            connection: "a".into(),
            seq: 0,
            payload: Bytes::from_static(b"x"),
        }
    }

    #[tokio::test]
    async fn runs_in_order_and_stops_on_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tag = |name, fail| -> Arc<dyn FrameHandler> {
            Arc::new(Tag { name, fail, log: Arc::clone(&log) })
        };

        let chain = HandlerChain::new(vec![tag("first", false), tag("second", true), tag("third", false)]);
        assert_eq!(chain.names(), vec!["first", "second", "third"]);

        let err = chain.handle(frame()).await.unwrap_err();
        assert!(matches!(err, CamstreamError::MalformedFrame(ref m) if m == "second"));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }
}
