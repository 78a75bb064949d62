use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::SourceError;

/// One upstream response body as a stream of raw chunks.
///
/// Ends with `None` on completion or after yielding an `Err`. Dropping
/// the stream cancels the subscription and must close the underlying
/// connection; no item is observed after the drop.
pub type ChunkStream = BoxStream<'static, Result<Bytes, SourceError>>;

/// A cancellable, single-shot producer of raw byte chunks.
///
/// Each call to [`subscribe`](Self::subscribe) begins a brand-new
/// upstream request. Implementations should be lazy: no connection is
/// opened until the returned stream is first polled.
///
/// Closures returning a [`ChunkStream`] are sources too, which is handy
/// for test doubles:
///
/// ```rust
/// use bytes::Bytes;
/// use firehose_hub::{ByteChunkSource, ChunkStream};
/// use futures::StreamExt;
///
/// let source = || -> ChunkStream {
///     futures::stream::iter([Ok(Bytes::from_static(b"{\"id\":\"1\",\"text\":\"hi\"}\r\n"))]).boxed()
/// };
/// let _chunks = source.subscribe();
/// ```
pub trait ByteChunkSource: Send + Sync + 'static {
    fn subscribe(&self) -> ChunkStream;
}

impl<F> ByteChunkSource for F
where
    F: Fn() -> ChunkStream + Send + Sync + 'static,
{
    fn subscribe(&self) -> ChunkStream {
        self()
    }
}

/// The three things an upstream subscription can deliver.
#[derive(Debug)]
pub enum SourceEvent {
    Chunk(Bytes),
    Error(SourceError),
    Complete,
}

impl From<Option<Result<Bytes, SourceError>>> for SourceEvent {
    fn from(item: Option<Result<Bytes, SourceError>>) -> Self {
        match item {
            Some(Ok(chunk)) => Self::Chunk(chunk),
            Some(Err(err)) => Self::Error(err),
            None => Self::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_items_map_to_events() {
        assert!(matches!(
            SourceEvent::from(Some(Ok(Bytes::from_static(b"x")))),
            SourceEvent::Chunk(c) if c.as_ref() == b"x"
        ));
        assert!(matches!(
            SourceEvent::from(Some(Err(SourceError::Status { status: 401 }))),
            SourceEvent::Error(SourceError::Status { status: 401 })
        ));
        assert!(matches!(SourceEvent::from(None), SourceEvent::Complete));
    }
}
