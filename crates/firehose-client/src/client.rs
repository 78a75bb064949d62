use std::time::Duration;

use firehose_hub::{ByteChunkSource, ChunkStream, SourceError};
use futures::{StreamExt, TryFutureExt, TryStreamExt};
use reqwest::Url;
use reqwest::header::AUTHORIZATION;

use crate::error::ClientError;
use crate::oauth::{self, Credentials};

/// The filtered public stream.
pub const DEFAULT_ENDPOINT: &str = "https://stream.twitter.com/1.1/statuses/filter.json";

/// Applied to connection setup only. The body of a streaming response
/// is read indefinitely.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP [`ByteChunkSource`]: one signed streaming `POST` per subscribe.
///
/// Each call to [`subscribe`](ByteChunkSource::subscribe) returns a lazy
/// stream. When first polled it signs a fresh request (new nonce and
/// timestamp), sends it, and checks the status before yielding body
/// chunks. A non-2xx status ends the stream with
/// [`SourceError::Status`] before any bytes are delivered. Dropping the
/// stream drops the response, which closes the connection.
///
/// ```rust,no_run
/// use firehose_client::StreamClient;
/// use firehose_hub::MulticastHub;
///
/// # fn build() -> Result<(), firehose_client::ClientError> {
/// let client = StreamClient::builder()
///     .with_api_key("key")
///     .with_api_secret("secret")
///     .with_token("token")
///     .with_token_secret("token-secret")
///     .with_track_phrase("rust")
///     .build()?;
/// let hub = MulticastHub::new(client);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct StreamClient {
    http: reqwest::Client,
    credentials: Credentials,
    endpoint: Url,
    track: Vec<String>,
}

impl StreamClient {
    #[must_use]
    pub fn builder() -> StreamClientBuilder {
        StreamClientBuilder::default()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn track(&self) -> &[String] {
        &self.track
    }

    /// Comma-joined track phrases, the value of the `track` parameter.
    fn track_param(&self) -> String {
        self.track.join(",")
    }

    /// The full request URL, query included.
    #[must_use]
    pub fn request_url(&self) -> String {
        format!("{}?track={}", self.endpoint, oauth::encode(&self.track_param()))
    }

    /// Build a signed request for a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidSigningKey`] if signing fails.
    pub fn request(&self) -> Result<reqwest::RequestBuilder, ClientError> {
        let track = self.track_param();
        let authorization = self.credentials.authorization_header(
            "POST",
            self.endpoint.as_str(),
            &[("track", track.as_str())],
            &oauth::nonce(),
            oauth::timestamp(),
        )?;

        Ok(self
            .http
            .post(self.request_url())
            .header(AUTHORIZATION, authorization))
    }
}

impl ByteChunkSource for StreamClient {
    fn subscribe(&self) -> ChunkStream {
        let client = self.clone();

        async move {
            let request = client.request().map_err(SourceError::transport)?;
            tracing::info!(
                endpoint = %client.endpoint,
                track = ?client.track,
                "requesting stream"
            );

            let response = request.send().await.map_err(SourceError::transport)?;
            let status = response.status();
            tracing::info!(status = status.as_u16(), "received HTTP response status");

            if !status.is_success() {
                return Err(SourceError::Status {
                    status: status.as_u16(),
                });
            }

            tracing::info!(headers = ?response.headers(), "received HTTP response headers");
            Ok::<_, SourceError>(response.bytes_stream().map_err(SourceError::transport))
        }
        .try_flatten_stream()
        .boxed()
    }
}

/// Builder for [`StreamClient`].
///
/// ```text
/// ┌────────────────────┬───────────────────────────────────────────────┐
/// │ Method             │ Purpose                                       │
/// ├────────────────────┼───────────────────────────────────────────────┤
/// │ with_api_key       │ OAuth consumer key (required)                 │
/// │ with_api_secret    │ OAuth consumer secret (required)              │
/// │ with_token         │ OAuth access token (required)                 │
/// │ with_token_secret  │ OAuth access token secret (required)          │
/// │ with_track_phrase  │ Add one phrase to filter on (at least one)    │
/// │ with_endpoint      │ Override the stream URL (no query string)     │
/// │ with_http_client   │ Supply a preconfigured reqwest client         │
/// └────────────────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Default)]
pub struct StreamClientBuilder {
    api_key: Option<String>,
    api_secret: Option<String>,
    token: Option<String>,
    token_secret: Option<String>,
    track: Vec<String>,
    endpoint: Option<String>,
    http: Option<reqwest::Client>,
}

impl StreamClientBuilder {
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(api_secret.into());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_token_secret(mut self, token_secret: impl Into<String>) -> Self {
        self.token_secret = Some(token_secret.into());
        self
    }

    #[must_use]
    pub fn with_track_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.track.push(phrase.into());
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validate the configuration and build the client.
    ///
    /// # Errors
    ///
    /// - [`ClientError::MissingCredential`] if any credential is unset or empty.
    /// - [`ClientError::NoTrackPhrases`] if no non-blank phrase was added.
    /// - [`ClientError::InvalidEndpoint`] if the endpoint is not an absolute
    ///   URL or already carries a query string.
    /// - [`ClientError::Http`] if the default HTTP client cannot be built.
    pub fn build(self) -> Result<StreamClient, ClientError> {
        let credentials = Credentials {
            consumer_key: required(self.api_key, "api key")?,
            consumer_secret: required(self.api_secret, "api secret")?,
            token: required(self.token, "token")?,
            token_secret: required(self.token_secret, "token secret")?,
        };

        let track: Vec<String> = self
            .track
            .into_iter()
            .map(|phrase| phrase.trim().to_owned())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        if track.is_empty() {
            return Err(ClientError::NoTrackPhrases);
        }

        let raw = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let endpoint = Url::parse(&raw).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: raw.clone(),
            reason: e.to_string(),
        })?;
        if endpoint.query().is_some() {
            return Err(ClientError::InvalidEndpoint {
                endpoint: raw,
                reason: "query parameters are derived from the track phrases".into(),
            });
        }

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()?,
        };

        Ok(StreamClient {
            http,
            credentials,
            endpoint,
            track,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ClientError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ClientError::MissingCredential(name))
}
