//! Message-stream event classification: decoded frames → typed events.
//!
//! Pure deterministic mapping keyed by event name:
//!   message_start       → MessageStart (usage at `message.usage`)
//!   content_block_delta → ContentDelta
//!   message_delta       → MessageDelta (usage at `usage`)
//!   message_stop        → MessageStop
//!   (others, JSON)      → Other
//!   (others, raw text)  → Malformed
//!
//! Milestone events are recognized by name alone: a `message_stop` whose
//! payload failed to parse still terminates the stream.

use serde::Deserialize;

use crate::sse::{DecodedEvent, EventPayload};

pub const MESSAGE_START: &str = "message_start";
pub const CONTENT_BLOCK_DELTA: &str = "content_block_delta";
pub const MESSAGE_DELTA: &str = "message_delta";
pub const MESSAGE_STOP: &str = "message_stop";

/// Token counters carried by a usage-bearing event. Absent fields are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UsageUpdate {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
}

/// Typed view of one decoded event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<'a> {
    MessageStart { usage: Option<UsageUpdate> },
    ContentDelta,
    MessageDelta { usage: Option<UsageUpdate> },
    MessageStop,
    Other { name: &'a str },
    Malformed { name: &'a str, raw_text: &'a str },
}

impl<'a> StreamEvent<'a> {
    pub fn classify(event: &'a DecodedEvent) -> Self {
        match event.name.as_str() {
            MESSAGE_START => StreamEvent::MessageStart {
                usage: usage_at(event, "/message/usage"),
            },
            CONTENT_BLOCK_DELTA => StreamEvent::ContentDelta,
            MESSAGE_DELTA => StreamEvent::MessageDelta {
                usage: usage_at(event, "/usage"),
            },
            MESSAGE_STOP => StreamEvent::MessageStop,
            name => match &event.payload {
                EventPayload::Json(_) => StreamEvent::Other { name },
                EventPayload::Raw(raw_text) => StreamEvent::Malformed { name, raw_text },
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::MessageStop)
    }
}

fn usage_at(event: &DecodedEvent, pointer: &str) -> Option<UsageUpdate> {
    let value = event.json()?.pointer(pointer)?;
    UsageUpdate::deserialize(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_event(name: &str, payload: serde_json::Value) -> DecodedEvent {
        DecodedEvent {
            name: name.to_string(),
            payload: EventPayload::Json(payload),
        }
    }

    #[test]
    fn test_message_start_usage() {
        let event = json_event(
            MESSAGE_START,
            json!({"message": {"usage": {"input_tokens": 12, "cache_read_input_tokens": 3}}}),
        );
        let StreamEvent::MessageStart { usage: Some(usage) } = StreamEvent::classify(&event) else {
            panic!("expected message_start with usage");
        };
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.cache_read_input_tokens, Some(3));
        assert_eq!(usage.output_tokens, None);
    }

    #[test]
    fn test_message_delta_usage() {
        let event = json_event(MESSAGE_DELTA, json!({"usage": {"output_tokens": 40}}));
        assert_eq!(
            StreamEvent::classify(&event),
            StreamEvent::MessageDelta {
                usage: Some(UsageUpdate {
                    output_tokens: Some(40),
                    ..UsageUpdate::default()
                })
            }
        );
    }

    #[test]
    fn test_usage_missing_is_none() {
        let event = json_event(MESSAGE_START, json!({"message": {}}));
        assert_eq!(
            StreamEvent::classify(&event),
            StreamEvent::MessageStart { usage: None }
        );
    }

    #[test]
    fn test_malformed_stop_still_terminal() {
        let event = DecodedEvent {
            name: MESSAGE_STOP.to_string(),
            payload: EventPayload::Raw("garbage".into()),
        };
        assert!(StreamEvent::classify(&event).is_terminal());
    }

    #[test]
    fn test_unknown_events() {
        let ping = json_event("ping", json!({"type": "ping"}));
        assert_eq!(StreamEvent::classify(&ping), StreamEvent::Other { name: "ping" });

        let bad = DecodedEvent {
            name: "error".to_string(),
            payload: EventPayload::Raw("oops".into()),
        };
        assert_eq!(
            StreamEvent::classify(&bad),
            StreamEvent::Malformed {
                name: "error",
                raw_text: "oops"
            }
        );
    }
}
