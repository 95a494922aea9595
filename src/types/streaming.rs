//! Types for streaming responses.

use std::fmt;
use std::pin::Pin;

use futures_util::Stream;
use serde::{Serialize, Serializer};

use crate::Error;

/// A lazily evaluated stream of token events.
///
/// The stream ends when the backend closes the transport. A final event
/// carrying a finish reason may or may not precede that, so consumers must
/// treat exhaustion itself as normal termination.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<TokenEvent, Error>> + Send>>;

/// One incremental unit of a streamed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenEvent {
    /// Text fragment carried by this event. Empty when the backend sent a
    /// choice without a content delta.
    pub message: String,
    /// Reported termination cause, if the backend attached one.
    #[serde(serialize_with = "finish_reason_as_text")]
    pub finish_reason: Option<FinishReason>,
}

impl TokenEvent {
    /// Whether this event carries a termination cause.
    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Reason why generation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

impl FinishReason {
    /// Parse a backend-reported finish reason.
    ///
    /// Absent and empty values mean generation is still in flight.
    /// Unrecognized reasons collapse to [`FinishReason::Stop`].
    pub fn from_wire(raw: Option<&str>) -> Option<Self> {
        match raw {
            None | Some("") => None,
            Some("length") => Some(FinishReason::Length),
            Some("tool_calls") => Some(FinishReason::ToolCalls),
            Some("content_filter") => Some(FinishReason::ContentFilter),
            Some(_) => Some(FinishReason::Stop),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ToolCalls => "tool_calls",
            FinishReason::ContentFilter => "content_filter",
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize an absent finish reason as the empty string, so every event
/// carries both fields in a stable textual shape.
fn finish_reason_as_text<S>(reason: &Option<FinishReason>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match reason {
        Some(r) => serializer.serialize_str(r.as_str()),
        None => serializer.serialize_str(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire(None), None);
        assert_eq!(FinishReason::from_wire(Some("")), None);
        assert_eq!(FinishReason::from_wire(Some("stop")), Some(FinishReason::Stop));
        assert_eq!(
            FinishReason::from_wire(Some("length")),
            Some(FinishReason::Length)
        );
        assert_eq!(
            FinishReason::from_wire(Some("tool_calls")),
            Some(FinishReason::ToolCalls)
        );
        assert_eq!(
            FinishReason::from_wire(Some("content_filter")),
            Some(FinishReason::ContentFilter)
        );
    }

    #[test]
    fn test_unknown_finish_reason_collapses_to_stop() {
        assert_eq!(
            FinishReason::from_wire(Some("model_decided_to_nap")),
            Some(FinishReason::Stop)
        );
    }

    #[test]
    fn test_token_event_serializes_absent_reason_as_empty_text() {
        let pending = TokenEvent {
            message: "Hel".to_string(),
            finish_reason: None,
        };
        assert_eq!(
            serde_json::to_value(&pending).unwrap(),
            json!({"message": "Hel", "finish_reason": ""})
        );

        let done = TokenEvent {
            message: String::new(),
            finish_reason: Some(FinishReason::Stop),
        };
        assert_eq!(
            serde_json::to_value(&done).unwrap(),
            json!({"message": "", "finish_reason": "stop"})
        );
    }

    #[test]
    fn test_is_final_tracks_finish_reason() {
        let pending = TokenEvent {
            message: "x".to_string(),
            finish_reason: None,
        };
        assert!(!pending.is_final());

        let done = TokenEvent {
            message: String::new(),
            finish_reason: Some(FinishReason::Length),
        };
        assert!(done.is_final());
    }
}
