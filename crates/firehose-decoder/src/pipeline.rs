use firehose_types::Record;
use firehose_wire::{FrameAssembler, FrameSplitter};

use crate::decoder::RecordDecoder;
use crate::error::DecodeError;
use crate::filter::RecordFilter;

/// Counters for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub chunks: u64,
    pub bytes: u64,
    pub frames: u64,
    pub records: u64,
    pub dropped: u64,
}

/// The per-subscription transform chain from raw chunks to records.
///
/// ```text
///   &[u8] ─▶ FrameSplitter ─▶ FrameAssembler ─▶ RecordDecoder ─▶ RecordFilter ─▶ Record
///            (utf-8, tokens)   (frames)          (json)            (heartbeats)
/// ```
///
/// Every stage runs synchronously on the caller's context, one chunk at
/// a time. The splitter and assembler hold state that must not be shared
/// across subscriptions, so a fresh pipeline is built for each one.
///
/// A decode error poisons the pipeline. The error is returned as the
/// last item of the chunk that produced it; records from earlier frames
/// of that chunk come before it, and every later push returns nothing.
#[derive(Debug, Default)]
pub struct FramePipeline {
    splitter: FrameSplitter,
    assembler: FrameAssembler,
    decoder: RecordDecoder,
    filter: RecordFilter,
    stats: PipelineStats,
    failed: bool,
}

impl FramePipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline around explicitly configured stages.
    #[must_use]
    pub fn with_stages(decoder: RecordDecoder, filter: RecordFilter) -> Self {
        Self {
            decoder,
            filter,
            ..Self::default()
        }
    }

    /// Run one chunk through every stage.
    ///
    /// Returns the admitted records in arrival order. At most one `Err`
    /// is ever returned over the pipeline's life, always last.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<Record, DecodeError>> {
        let mut out = Vec::new();
        if self.failed {
            return out;
        }

        self.stats.chunks += 1;
        self.stats.bytes += chunk.len() as u64;

        let frames = self.assembler.push(self.splitter.split(chunk));

        for frame in frames {
            self.stats.frames += 1;

            if !self.filter.admits_frame(&frame) {
                self.stats.dropped += 1;
                continue;
            }

            match self.decoder.decode(&frame) {
                Ok(record) if self.filter.admits(&record) => {
                    self.stats.records += 1;
                    out.push(Ok(record));
                }
                Ok(record) => {
                    tracing::trace!(id = %record.id, "dropping record without text");
                    self.stats.dropped += 1;
                }
                Err(err) => {
                    self.failed = true;
                    out.push(Err(err));
                    break;
                }
            }
        }

        out
    }

    /// End of upstream: drop any partial frame still being assembled.
    ///
    /// Returns the number of bytes discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.assembler.discard() + self.splitter.pending_bytes();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "discarding unterminated trailing frame");
        }
        self.splitter = FrameSplitter::new();
        dropped
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }
}
