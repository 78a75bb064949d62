use std::sync::Arc;

use firehose_decoder::DecodeError;

/// Failures reported by a [`ByteChunkSource`](crate::ByteChunkSource).
///
/// ```text
/// ┌───────────┬──────────────────────────────────────────────────────┐
/// │ Variant   │ Cause                                                │
/// ├───────────┼──────────────────────────────────────────────────────┤
/// │ Status    │ Non-success HTTP status, before any body bytes       │
/// │ Transport │ Connection, TLS, or mid-body read failure            │
/// │ Io        │ Failure of a non-HTTP byte source                    │
/// └───────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Received HTTP response status: {status}")]
    Status { status: u16 },

    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }

    /// The HTTP status code, for [`SourceError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// The terminal error broadcast to every attached consumer.
///
/// Each consumer receives its own clone; the underlying error is shared.
#[derive(Clone, Debug, thiserror::Error)]
pub enum StreamError {
    #[error("upstream failed: {0}")]
    Source(#[source] Arc<SourceError>),

    #[error("decode failed: {0}")]
    Decode(#[source] Arc<DecodeError>),
}

impl StreamError {
    /// The HTTP status code, when the upstream rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Source(err) => err.status(),
            Self::Decode(_) => None,
        }
    }

    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<SourceError> for StreamError {
    fn from(err: SourceError) -> Self {
        Self::Source(Arc::new(err))
    }
}

impl From<DecodeError> for StreamError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(Arc::new(err))
    }
}
