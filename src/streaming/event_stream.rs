//! Lazy event-stream decoding.
//!
//! Bodies framed as server-sent events yield their `data:` payloads; any
//! other body yields each raw chunk. Either way every item goes through the
//! stringified-value parser in arrival order, and nothing is buffered beyond
//! what the SSE framing needs to complete one event.

use super::ByteStream;
use crate::error::TreatyError;
use crate::utils::parse_stringified_value;
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, stream};
use serde_json::Value;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

type ValueStream = Pin<Box<dyn Stream<Item = Result<Value, TreatyError>> + Send>>;

/// Line prefixes that mark a body as SSE framed.
const SSE_FIELD_PREFIXES: [&str; 5] = ["data:", "event:", "id:", "retry:", ":"];

/// Parsed chunks of a `text/event-stream` response.
pub struct EventStream {
    inner: ValueStream,
}

impl EventStream {
    /// Parse a byte stream lazily.
    ///
    /// The first chunk with visible content decides the framing: when it
    /// starts with an SSE field the body is read as server-sent events
    /// (empty payloads skipped), otherwise every non-empty chunk is parsed on
    /// its own. Transport and framing errors end the stream.
    pub fn from_bytes(byte_stream: ByteStream) -> Self {
        let out = async_stream::stream! {
            let mut byte_stream = byte_stream;
            let mut head: Vec<Result<Bytes, TreatyError>> = Vec::new();

            let framed = loop {
                match byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        let decided = sse_framing(&chunk);
                        head.push(Ok(chunk));
                        if let Some(framed) = decided {
                            break framed;
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(stream_error(e));
                        return;
                    }
                    None => break false,
                }
            };

            let chunks = stream::iter(head).chain(byte_stream);
            let mut values = if framed {
                sse_values(chunks)
            } else {
                raw_values(chunks)
            };
            while let Some(item) = values.next().await {
                yield item;
            }
        };

        Self {
            inner: Box::pin(out),
        }
    }

    /// A stream yielding one parsed item from an already buffered body.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_value(parse_stringified_value(&text.into()))
    }

    /// A stream yielding `value` once.
    pub fn from_value(value: Value) -> Self {
        Self {
            inner: Box::pin(stream::once(async move { Ok(value) })),
        }
    }

    /// A stream that ends immediately.
    pub fn empty() -> Self {
        Self {
            inner: Box::pin(stream::empty()),
        }
    }

    /// Drain the stream, stopping at the first error.
    pub async fn collect_values(mut self) -> Result<Vec<Value>, TreatyError> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }
}

/// `Some(true)` for a chunk opening with an SSE field, `Some(false)` for any
/// other visible content and `None` for a blank chunk.
fn sse_framing(chunk: &[u8]) -> Option<bool> {
    let text = String::from_utf8_lossy(chunk);
    let line = text.trim_start_matches('\u{feff}').trim_start();
    if line.is_empty() {
        return None;
    }
    Some(SSE_FIELD_PREFIXES.iter().any(|field| line.starts_with(field)))
}

fn stream_error(e: impl fmt::Display) -> TreatyError {
    TreatyError::StreamError(format!("event stream error: {e}"))
}

fn sse_values<S>(chunks: S) -> ValueStream
where
    S: Stream<Item = Result<Bytes, TreatyError>> + Send + Unpin + 'static,
{
    Box::pin(async_stream::stream! {
        let mut events = chunks.eventsource();

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(ev) => ev,
                Err(e) => {
                    yield Err(stream_error(e));
                    return;
                }
            };

            tracing::trace!(
                target: "treaty::http",
                event_name = %event.event,
                id = %event.id,
                "event stream chunk"
            );

            if event.data.is_empty() {
                continue;
            }
            yield Ok(parse_stringified_value(&event.data));
        }
    })
}

fn raw_values<S>(chunks: S) -> ValueStream
where
    S: Stream<Item = Result<Bytes, TreatyError>> + Send + Unpin + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = chunks;

        while let Some(item) = chunks.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(stream_error(e));
                    return;
                }
            };
            if chunk.is_empty() {
                continue;
            }

            tracing::trace!(target: "treaty::http", len = chunk.len(), "raw stream chunk");
            yield Ok(parse_stringified_value(&String::from_utf8_lossy(&chunk)));
        }
    })
}

impl Stream for EventStream {
    type Item = Result<Value, TreatyError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventStream(..)")
    }
}
