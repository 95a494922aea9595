//! Pluggable answer generation for Retrieval-Augmented Generation pipelines.
//!
//! This library composes retrieved context passages, user queries, and prior
//! conversation turns into a provider-agnostic prompt and sends it to an LLM
//! backend, either as one blocking completion or as an incremental token
//! stream. Backends for OpenAI-compatible chat completions APIs (including
//! Azure deployment routing) and Gemini on Vertex AI are included.

pub mod backends;
pub mod composer;
pub mod config;
pub mod error;
pub mod generator;
pub mod sse;
pub mod types;

// Re-export core types for easy usage
pub use backends::{ChatCompletionsGenerator, VertexGeminiGenerator};
pub use composer::{compose, SYSTEM_PROMPT};
pub use config::{ApiFlavor, ChatConfig, GeneratorConfig, GeneratorFactory, VertexConfig};
pub use error::Error;
pub use generator::Generator;
pub use sse::SseEvent;
pub use types::*;
