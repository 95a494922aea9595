//! Wire types for the chat completions protocol.

use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Message, TokenEvent};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Deployment selector, present only under deployment-style routing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Non-streaming completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: String,
}

/// One server-sent chunk of a streaming completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental delta inside a chunk choice. Role-only deltas carry no
/// content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Map a chunk onto at most one token event.
    ///
    /// Chunks without choices (keep-alive or usage-only chunks) produce no
    /// event. A choice without a content fragment still produces an
    /// empty-message event, so a finish reason delivered on its own reaches
    /// the consumer.
    pub(crate) fn into_token_event(self) -> Option<TokenEvent> {
        let choice = self.choices.into_iter().next()?;
        Some(TokenEvent {
            message: choice.delta.content.unwrap_or_default(),
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        })
    }
}
