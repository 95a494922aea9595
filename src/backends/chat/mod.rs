//! Backend speaking the OpenAI-compatible chat completions protocol.

pub mod generator;
pub mod types;

pub use generator::ChatCompletionsGenerator;
