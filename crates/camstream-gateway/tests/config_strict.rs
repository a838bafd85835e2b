#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use camstream_gateway::config::{self, HandlerKind, OnOversize};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:9000"
frames:
  max_frame_byte: 123 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:9000");
    assert_eq!(cfg.frames.queue_capacity, 256);
    assert_eq!(cfg.frames.on_oversize, OnOversize::Reject);
    assert_eq!(cfg.frames.handlers, vec![HandlerKind::Length]);
    assert!(cfg.frames.events.iter().any(|e| e == "receiveImage"));
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9100"
  ping_interval_ms: 10000
  idle_timeout_ms: 30000
frames:
  max_frame_bytes: 1048576
  queue_capacity: 16
  on_oversize: close
  events: ["*"]
  handlers: [length, jpeg]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.frames.max_frame_bytes, 1_048_576);
    assert_eq!(cfg.frames.on_oversize, OnOversize::Close);
    assert_eq!(cfg.frames.handlers, vec![HandlerKind::Length, HandlerKind::Jpeg]);
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_out_of_range_values() {
    let cases = [
        "version: 1\nframes:\n  queue_capacity: 0\n",
        "version: 1\nframes:\n  max_frame_bytes: 0\n",
        "version: 1\nframes:\n  handlers: []\n",
        "version: 1\nframes:\n  events: []\n",
        "version: 1\nframes:\n  handlers: [display]\n",
        "version: 1\ngateway:\n  ping_interval_ms: 30000\n  idle_timeout_ms: 20000\n",
    ];
    for c in cases {
        let err = config::load_from_str(c).expect_err(c);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "case={c}");
    }
}
