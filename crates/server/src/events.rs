//! Wire events for the answer stream.
//!
//! One request produces the strictly ordered sequence
//! `Token* Sources Done`: zero or more tokens, exactly one sources
//! event, exactly one terminal done event. Events are serialized with a
//! `type` tag and `content` payload and sent as discrete, flush-per-
//! event SSE messages.

use axum::response::sse::Event;
use serde::{Deserialize, Serialize};

/// One unit of the token/sources/done protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum StreamEvent {
    /// An incremental answer fragment
    Token(String),

    /// The full attributed source list, sent after all tokens
    Sources(Vec<String>),

    /// Terminal marker; always the last event of a stream
    Done,
}

impl StreamEvent {
    /// The SSE event name for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Token(_) => "token",
            StreamEvent::Sources(_) => "sources",
            StreamEvent::Done => "done",
        }
    }

    /// Convert into a named SSE event with a JSON data payload.
    pub fn into_sse(self) -> Event {
        let event = Event::default().event(self.kind());
        match event.json_data(&self) {
            Ok(event) => event,
            // StreamEvent serialization cannot realistically fail; fall
            // back to a bare done marker rather than panicking.
            Err(_) => Event::default().event("done").data(r#"{"type":"done"}"#),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wire_shape() {
        let json = serde_json::to_value(StreamEvent::Token("Par".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "token", "content": "Par"}));
    }

    #[test]
    fn test_sources_wire_shape() {
        let event = StreamEvent::Sources(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "sources", "content": ["a", "b"]}));
    }

    #[test]
    fn test_done_wire_shape_has_no_content() {
        let json = serde_json::to_value(StreamEvent::Done).unwrap();
        assert_eq!(json, serde_json::json!({"type": "done"}));
    }

    #[test]
    fn test_roundtrip() {
        let events = vec![
            StreamEvent::Token("x".to_string()),
            StreamEvent::Sources(vec!["s".to_string()]),
            StreamEvent::Done,
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: StreamEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(StreamEvent::Token(String::new()).kind(), "token");
        assert_eq!(StreamEvent::Sources(vec![]).kind(), "sources");
        assert_eq!(StreamEvent::Done.kind(), "done");
    }
}
