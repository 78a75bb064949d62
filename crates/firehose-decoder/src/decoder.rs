use firehose_types::Record;
use firehose_wire::Frame;

use crate::error::DecodeError;

/// Characters of frame text kept in a [`DecodeError::Malformed`] preview.
const DEFAULT_PREVIEW_CHARS: usize = 64;

/// Parses a frame's text into a [`Record`].
///
/// Unknown JSON fields are ignored. Anything that is not a decodable
/// JSON object is an error, and the caller must treat it as the end of
/// the stream.
#[derive(Clone, Copy, Debug)]
pub struct RecordDecoder {
    preview_chars: usize,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self {
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl RecordDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how much of a malformed frame is kept for diagnostics.
    #[must_use]
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Decode one frame.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the frame text is not a
    /// JSON document of the record shape.
    pub fn decode(&self, frame: &Frame) -> Result<Record, DecodeError> {
        serde_json::from_str(frame.as_str()).map_err(|source| DecodeError::Malformed {
            preview: frame.as_str().chars().take(self.preview_chars).collect(),
            len: frame.len(),
            source,
        })
    }
}
