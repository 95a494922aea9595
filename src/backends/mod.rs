//! Generation backend implementations.

pub mod chat;
pub mod vertex;

pub use chat::ChatCompletionsGenerator;
pub use vertex::VertexGeminiGenerator;
