//! Streaming
//!
//! Raw byte streams handed over by transports, and the lazy [`EventStream`]
//! produced when a response is `text/event-stream`.

mod event_stream;

pub use event_stream::EventStream;

use crate::error::TreatyError;
use bytes::Bytes;
use futures_util::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Response body chunks as they arrive from the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TreatyError>> + Send>>;

/// Shared, take-once handle on a [`ByteStream`].
///
/// A streamed body can be consumed once. Clones of a response share the
/// handle; whichever decodes it first gets the stream and later takers see
/// `None`.
#[derive(Clone)]
pub struct StreamHandle(Arc<Mutex<Option<ByteStream>>>);

impl StreamHandle {
    pub fn new(stream: ByteStream) -> Self {
        Self(Arc::new(Mutex::new(Some(stream))))
    }

    pub fn take(&self) -> Option<ByteStream> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }

    /// True while the stream has not been taken.
    pub fn is_available(&self) -> bool {
        self.0.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("available", &self.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[test]
    fn handle_is_taken_once() {
        let s: ByteStream = Box::pin(stream::iter(vec![Ok(Bytes::from_static(b"x"))]));
        let handle = StreamHandle::new(s);
        let clone = handle.clone();
        assert!(clone.is_available());
        assert!(handle.take().is_some());
        assert!(clone.take().is_none());
        assert!(!handle.is_available());
    }
}
