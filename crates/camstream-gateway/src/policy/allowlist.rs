//! Event-name allowlist compilation and matching.
//!
//! Entries are exact names (`receiveImage`), a trailing wildcard
//! (`camera.*`), or `*` for any event.

use camstream_core::error::{CamstreamError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRule {
    Any,
    Exact(String),
    Prefix(String),
}

pub fn compile_event_rules(raw: &[String]) -> Result<Vec<EventRule>> {
    let mut out = Vec::with_capacity(raw.len());
    for s in raw {
        let s = s.trim();
        let rule = match s {
            "" => {
                return Err(CamstreamError::BadRequest("empty event allowlist entry".into()));
            }
            "*" => EventRule::Any,
            _ => match s.strip_suffix('*') {
                Some(prefix) if prefix.contains('*') => {
                    return Err(CamstreamError::BadRequest(format!(
                        "invalid event allowlist entry: {s} (only a trailing * is supported)"
                    )));
                }
                Some(prefix) => EventRule::Prefix(prefix.to_string()),
                None if s.contains('*') => {
                    return Err(CamstreamError::BadRequest(format!(
                        "invalid event allowlist entry: {s} (only a trailing * is supported)"
                    )));
                }
                None => EventRule::Exact(s.to_string()),
            },
        };
        out.push(rule);
    }
    Ok(out)
}

pub fn is_event_allowed(rules: &[EventRule], event: &str) -> bool {
    rules.iter().any(|r| match r {
        EventRule::Any => true,
        EventRule::Exact(name) => name == event,
        EventRule::Prefix(p) => event.starts_with(p.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(raw: &[&str]) -> Vec<EventRule> {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        compile_event_rules(&raw).unwrap()
    }

    #[test]
    fn exact_prefix_and_any() {
        let r = rules(&["receiveImage", "camera.*"]);
        assert!(is_event_allowed(&r, "receiveImage"));
        assert!(is_event_allowed(&r, "camera.front"));
        assert!(!is_event_allowed(&r, "newImage"));

        let any = rules(&["*"]);
        assert!(is_event_allowed(&any, "whatever"));
    }

    #[test]
    fn rejects_inner_wildcards() {
        for bad in ["ca*mera", "*a*", ""] {
            assert!(compile_event_rules(&[bad.to_string()]).is_err(), "entry={bad}");
        }
    }
}
