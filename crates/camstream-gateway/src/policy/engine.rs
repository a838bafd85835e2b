use camstream_core::error::{CamstreamError, Result};

pub use crate::config::schema::OnOversize;
use crate::config::schema::FramesSection;

use super::allowlist::{compile_event_rules, is_event_allowed, EventRule};

/// Decision from policy evaluation.
#[derive(Debug)]
pub enum PolicyDecision {
    Pass,
    /// Reply with the error, drop the message, keep the connection.
    Reject(CamstreamError),
    /// Reply with the error and close the connection.
    Close(CamstreamError),
}

/// Compiled frame policy. Construct once at startup, then share via Arc.
pub struct FramePolicy {
    max_frame_bytes: usize,
    on_oversize: OnOversize,
    event_rules: Vec<EventRule>,
}

impl FramePolicy {
    pub fn new(frames: &FramesSection) -> Result<Self> {
        Ok(Self {
            max_frame_bytes: frames.max_frame_bytes,
            on_oversize: frames.on_oversize,
            event_rules: compile_event_rules(&frames.events)?,
        })
    }

    /// Size check on the frame payload: the binary message as received, or
    /// the decoded `data` of a text envelope. The raw message is bounded
    /// separately by the transport's message limit.
    pub fn check_len(&self, bytes_len: usize) -> PolicyDecision {
        if bytes_len <= self.max_frame_bytes {
            return PolicyDecision::Pass;
        }
        let err = CamstreamError::PayloadTooLarge {
            len: bytes_len,
            max: self.max_frame_bytes,
        };
        match self.on_oversize {
            OnOversize::Reject => PolicyDecision::Reject(err),
            OnOversize::Close => PolicyDecision::Close(err),
        }
    }

    /// Text lane: the envelope's event name must be allowlisted.
    pub fn check_event(&self, event: &str) -> PolicyDecision {
        if is_event_allowed(&self.event_rules, event) {
            PolicyDecision::Pass
        } else {
            PolicyDecision::Reject(CamstreamError::NotAllowed(format!("event {event:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use camstream_core::ClientCode;

    use super::*;

    fn policy(max: usize, on_oversize: OnOversize) -> FramePolicy {
        let frames = FramesSection {
            max_frame_bytes: max,
            on_oversize,
            ..FramesSection::default()
        };
        FramePolicy::new(&frames).unwrap()
    }

    #[test]
    fn len_limit_is_inclusive() {
        let p = policy(10, OnOversize::Reject);
        assert!(matches!(p.check_len(10), PolicyDecision::Pass));
        assert!(matches!(
            p.check_len(11),
            PolicyDecision::Reject(CamstreamError::PayloadTooLarge { len: 11, max: 10 })
        ));
    }

    #[test]
    fn oversize_can_close() {
        let p = policy(10, OnOversize::Close);
        match p.check_len(11) {
            PolicyDecision::Close(e) => assert_eq!(e.client_code(), ClientCode::PayloadTooLarge),
            other => panic!("expected close, got {other:?}"),
        }
    }

    #[test]
    fn default_events_cover_client_variants() {
        let p = policy(10, OnOversize::Reject);
        for e in ["receiveImage", "newImage", "sendPicture"] {
            assert!(matches!(p.check_event(e), PolicyDecision::Pass), "event={e}");
        }
        match p.check_event("chat") {
            PolicyDecision::Reject(e) => {
                assert_eq!(e.client_code(), ClientCode::NotAllowed);
                assert!(e.to_string().contains("chat"));
            }
            other => panic!("expected reject, got {other:?}"),
        }
    }
}
