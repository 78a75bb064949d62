#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod oauth;

pub use client::{DEFAULT_ENDPOINT, StreamClient, StreamClientBuilder};
pub use error::ClientError;
pub use oauth::Credentials;
