//! Wire types for the Vertex AI `generateContent` surface.

use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, TokenEvent};

/// Request body for `generateContent` and `streamGenerateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<VertexContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<VertexContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A content block: a role ("user" or "model") plus ordered text parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexContent {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<VertexPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexPart {
    pub text: String,
}

/// Response body shared by the blocking call and every streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<VertexCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VertexCandidate {
    #[serde(default)]
    pub content: Option<VertexContent>,
    #[serde(rename = "finishReason")]
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Map a Vertex finish reason onto the shared enum.
///
/// Vertex reports upper-case reasons. Anything unrecognized collapses to
/// `Stop`, mirroring the chat backend.
pub(crate) fn finish_reason(raw: Option<&str>) -> Option<FinishReason> {
    match raw {
        None | Some("") => None,
        Some("MAX_TOKENS") => Some(FinishReason::Length),
        Some("SAFETY") => Some(FinishReason::ContentFilter),
        Some(_) => Some(FinishReason::Stop),
    }
}

impl GenerateContentResponse {
    /// Map one streamed chunk onto token events.
    ///
    /// Only the first candidate is consumed. A chunk without candidates
    /// yields nothing; a candidate without text still yields one
    /// empty-message event when it carries a finish reason. Multi-part
    /// chunks yield one event per part with the finish reason attached to
    /// the last.
    pub(crate) fn into_token_events(self) -> Vec<TokenEvent> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Vec::new();
        };
        let finish = finish_reason(candidate.finish_reason.as_deref());
        let texts: Vec<String> = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            return match finish {
                Some(reason) => vec![TokenEvent {
                    message: String::new(),
                    finish_reason: Some(reason),
                }],
                None => Vec::new(),
            };
        }

        let last = texts.len() - 1;
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| TokenEvent {
                message: text,
                finish_reason: if i == last { finish } else { None },
            })
            .collect()
    }
}
