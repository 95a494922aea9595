//! Backend targeting Gemini models on Vertex AI.

pub mod generator;
pub mod types;

pub use generator::VertexGeminiGenerator;
