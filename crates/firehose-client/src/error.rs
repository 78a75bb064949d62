/// Errors raised while configuring a [`StreamClient`](crate::StreamClient)
/// or signing its request.
///
/// Failures of the live connection are not here; they surface on the
/// chunk stream as [`SourceError`](firehose_hub::SourceError).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("at least one track phrase is required")]
    NoTrackPhrases,

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("request signing key rejected")]
    InvalidSigningKey,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
