use std::collections::VecDeque;

use firehose_types::Record;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::DecodeError;
use crate::pipeline::{FramePipeline, PipelineStats};

const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Asynchronous record reader over any `AsyncRead` source.
///
/// Runs a [`FramePipeline`] over bytes pulled from the reader, a chunk
/// at a time, and yields records as soon as their frame is complete.
/// This is how captured streams (files, stdin, sockets) are replayed
/// without the HTTP layer.
///
/// The reader progresses through two states:
///
/// ```text
///   Reading → Done
/// ```
///
/// It reaches `Done` at end of input (any unterminated tail is dropped),
/// on the first decode error, or on an I/O error. Errors are yielded once;
/// after that [`next`](Self::next) returns `None`.
///
/// # Example
///
/// ```rust,no_run
/// use firehose_decoder::RecordReader;
/// use tokio::io::AsyncRead;
///
/// async fn print_records(reader: impl AsyncRead + Unpin) {
///     let mut records = RecordReader::new(reader);
///     while let Some(result) = records.next().await {
///         match result {
///             Ok(record) => println!("{record}"),
///             Err(e) => eprintln!("stream ended: {e}"),
///         }
///     }
/// }
/// ```
pub struct RecordReader<R> {
    reader: R,
    pipeline: FramePipeline,
    ready: VecDeque<Result<Record, DecodeError>>,
    /// Read buffer, reused across chunks.
    buf: Vec<u8>,
    state: ReadState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadState {
    Reading,
    Done,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pipeline: FramePipeline::new(),
            ready: VecDeque::new(),
            buf: vec![0; DEFAULT_CHUNK_SIZE],
            state: ReadState::Reading,
        }
    }

    /// Read at most `chunk_size` bytes per pipeline push (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.buf = vec![0; chunk_size.max(1)];
        self
    }

    /// Yield the next record.
    ///
    /// Returns `Some(Ok(record))` per admitted record, `Some(Err(_))`
    /// once if the stream fails, and `None` when the stream is over.
    pub async fn next(&mut self) -> Option<Result<Record, DecodeError>> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                if item.is_err() {
                    self.state = ReadState::Done;
                    self.ready.clear();
                }
                return Some(item);
            }

            if self.state == ReadState::Done {
                return None;
            }

            let n = match self.reader.read(&mut self.buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.state = ReadState::Done;
                    return Some(Err(DecodeError::Io(e)));
                }
            };

            if n == 0 {
                self.pipeline.finish();
                self.state = ReadState::Done;
                continue;
            }

            self.ready.extend(self.pipeline.push(&self.buf[..n]));
        }
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }
}
