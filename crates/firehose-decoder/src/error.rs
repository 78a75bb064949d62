/// Errors that end a record stream.
///
/// A malformed frame is terminal: the pipeline does not skip it and
/// carry on. Any record that arrives after it on the same subscription
/// is never delivered.
///
/// ```text
///   DecodeError
///   ├── Malformed   ← frame text is not a decodable record
///   └── Io          ← from the underlying reader (RecordReader only)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame text failed JSON decoding.
    ///
    /// `preview` holds the start of the frame for diagnostics.
    #[error("malformed frame ({len} bytes) starting {preview:?}: {source}")]
    Malformed {
        preview: String,
        len: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An I/O error from the reader feeding the pipeline.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
