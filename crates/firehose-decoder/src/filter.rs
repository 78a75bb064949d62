use firehose_types::Record;
use firehose_wire::Frame;

/// Drops records that carry no payload.
///
/// The upstream interleaves keep-alives and control messages (rate-limit
/// notices, deletions) with real records. They are valid frames but have
/// no text, so they are dropped silently rather than surfaced as errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordFilter;

impl RecordFilter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// `true` when the record should reach consumers.
    #[must_use]
    pub fn admits(&self, record: &Record) -> bool {
        record.has_text()
    }

    /// `true` when the frame is worth decoding at all.
    ///
    /// Whitespace-only frames are heartbeats, not malformed records.
    #[must_use]
    pub fn admits_frame(&self, frame: &Frame) -> bool {
        !frame.is_blank()
    }
}
