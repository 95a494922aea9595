//! Stream adapter decoding Server-Sent Events from raw byte chunks.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::{Stream, StreamExt};
use memchr::memmem;

use crate::Error;

/// Upper bound on bytes buffered while waiting for an event boundary.
const MAX_BUFFERED_BYTES: usize = 1_000_000;

/// A decoded Server-Sent Event.
///
/// Only the `data` payload is retained. The backends in this crate carry
/// everything in `data:` lines, so the other SSE fields are dropped during
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub data: String,
}

impl SseEvent {
    /// Check for the `[DONE]` sentinel some chat backends emit before
    /// closing the connection.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Decodes SSE events from a byte stream.
///
/// Chunks are buffered until a full event boundary arrives, so events split
/// across network reads (including mid-character UTF-8 splits) decode
/// correctly. Both `\n\n` and `\r\n\r\n` boundaries are recognized.
pub struct SseDecoder<S> {
    inner: S,
    /// Raw bytes not yet terminated by an event boundary
    buffer: Vec<u8>,
    /// Decoded events awaiting the consumer
    decoded: VecDeque<SseEvent>,
}

impl<S> SseDecoder<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            decoded: VecDeque::new(),
        }
    }

    /// Move every complete event out of the byte buffer.
    fn drain_buffer(&mut self) -> Result<(), Error> {
        while let Some((end, sep_len)) = next_boundary(&self.buffer) {
            let text = std::str::from_utf8(&self.buffer[..end])
                .map_err(|e| Error::streaming(format!("invalid UTF-8 in SSE event: {e}")))?;
            if let Some(event) = parse_event(text) {
                self.decoded.push_back(event);
            }
            self.buffer.drain(..end + sep_len);
        }
        Ok(())
    }
}

/// Locate the earliest event boundary, returning its offset and length.
fn next_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = memmem::find(buf, b"\n\n");
    let crlf = memmem::find(buf, b"\r\n\r\n");
    match (lf, crlf) {
        (Some(l), Some(c)) if c < l => Some((c, 4)),
        (Some(l), _) => Some((l, 2)),
        (None, Some(c)) => Some((c, 4)),
        (None, None) => None,
    }
}

/// Parse one event block. Comment lines are skipped and multiple `data:`
/// lines are joined with newlines. A block without data yields no event.
fn parse_event(text: &str) -> Option<SseEvent> {
    let mut data_lines = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some((field, value)) = line.split_once(':') {
            if field == "data" {
                data_lines.push(value.strip_prefix(' ').unwrap_or(value));
            }
        }
    }

    if data_lines.is_empty() {
        return None;
    }
    Some(SseEvent {
        data: data_lines.join("\n"),
    })
}

impl<S, E> Stream for SseDecoder<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.decoded.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    if self.buffer.len() > MAX_BUFFERED_BYTES {
                        self.buffer.clear();
                        return Poll::Ready(Some(Err(Error::streaming(
                            "SSE event exceeded maximum buffered size",
                        ))));
                    }
                    if let Err(e) = self.drain_buffer() {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "transport failed mid-stream: {e}"
                    )))));
                }
                None => {
                    // Servers may close without terminating the last event.
                    if !self.buffer.is_empty() {
                        let tail = std::mem::take(&mut self.buffer);
                        if let Ok(text) = std::str::from_utf8(&tail) {
                            if let Some(event) = parse_event(text) {
                                return Poll::Ready(Some(Ok(event)));
                            }
                        }
                    }
                    return Poll::Ready(None);
                }
            }
        }
    }
}

/// Extension trait attaching SSE decoding to byte streams.
pub trait SseDecoderExt: Stream {
    /// Decode this byte stream as SSE events.
    fn sse_events(self) -> SseDecoder<Self>
    where
        Self: Sized,
    {
        SseDecoder::new(self)
    }
}

impl<S: Stream> SseDecoderExt for S {}
