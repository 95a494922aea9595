//! Core types used throughout the library.

pub mod message;
pub mod streaming;

// Re-export commonly used types
pub use message::*;
pub use streaming::*;
