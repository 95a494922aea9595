use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Message, TokenStream};
use crate::Error;

/// Temperature pinned on streaming requests so repeated runs over the same
/// retrieved context produce comparable token sequences.
pub const STREAM_TEMPERATURE: f32 = 0.0;

/// Total deadline applied to blocking requests.
///
/// Streaming requests carry no deadline at this layer; an open token stream
/// lives until the backend closes it, however slowly tokens arrive.
pub const BLOCKING_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on establishing the connection, shared by both request modes.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait implemented by all answer generation backends.
///
/// Both entry points take the same inputs: the user queries, the retrieved
/// context passages, and the prior conversation. [`generate`] issues one
/// blocking request and returns the finished answer; [`generate_stream`]
/// opens a streaming request and yields the answer incrementally.
///
/// [`generate`]: Generator::generate
/// [`generate_stream`]: Generator::generate_stream
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    /// Generate a complete answer in one request.
    async fn generate(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<String, Error>;

    /// Open a token stream for the same inputs.
    ///
    /// Errors raised while opening the request surface here; errors raised
    /// mid-stream surface as `Err` items on the returned stream.
    async fn generate_stream(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<TokenStream, Error>;

    /// Short identifier for this backend.
    fn name(&self) -> &str;

    /// Human-readable description of this backend.
    fn description(&self) -> &str;

    /// Upper bound on the context size this generator is configured for,
    /// in tokens.
    fn context_window(&self) -> usize;

    /// Whether this backend supports token streaming.
    fn streamable(&self) -> bool {
        true
    }
}
