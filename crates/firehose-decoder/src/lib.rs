#![warn(clippy::pedantic)]

pub mod decoder;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod streaming;

pub use decoder::RecordDecoder;
pub use error::DecodeError;
pub use filter::RecordFilter;
pub use pipeline::{FramePipeline, PipelineStats};
pub use streaming::RecordReader;
