use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;

use crate::error::ClientError;

/// Everything except the RFC 3986 unreserved characters is encoded.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Percent-encode per RFC 3986, as OAuth 1.0a requires.
#[must_use]
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}

/// A fresh random nonce.
#[must_use]
pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Seconds since the Unix epoch.
#[must_use]
pub fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// OAuth 1.0a application and user credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Build the `Authorization` header value for one request.
    ///
    /// `base_url` is the URL without its query; `params` are the query
    /// (and form body) parameters, which are covered by the signature.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidSigningKey`] if the HMAC key is
    /// rejected.
    pub fn authorization_header(
        &self,
        method: &str,
        base_url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String, ClientError> {
        let timestamp = timestamp.to_string();
        let mut oauth = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut all: Vec<(&str, &str)> = oauth.clone();
        all.extend_from_slice(params);
        let signature = self.sign(&base_string(method, base_url, &all))?;
        oauth.push(("oauth_signature", signature.as_str()));
        oauth.sort_unstable();

        let fields: Vec<String> = oauth
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect();

        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn sign(&self, base_string: &str) -> Result<String, ClientError> {
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|_| ClientError::InvalidSigningKey)?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// The RFC 5849 §3.4.1 signature base string.
///
/// ```text
///   METHOD & enc(base_url) & enc( k1=v1 & k2=v2 ... )   (pairs sorted after encoding)
/// ```
fn base_string(method: &str, base_url: &str, params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .collect();
    pairs.sort();

    let joined = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_url),
        encode(&joined)
    )
}
