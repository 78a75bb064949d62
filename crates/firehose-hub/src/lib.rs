#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod hub;
pub mod source;

pub use error::{SourceError, StreamError};
pub use event::HubEvent;
pub use hub::{MulticastHub, Subscription};
pub use source::{ByteChunkSource, ChunkStream, SourceEvent};
