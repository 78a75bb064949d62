#![warn(clippy::pedantic)]

pub mod assembler;
pub mod delimiter;
pub mod encode;
pub mod splitter;

pub use assembler::{Frame, FrameAssembler};
pub use delimiter::DELIMITER;
pub use encode::{encode_frames, write_frame};
pub use splitter::{FrameSplitter, SplitChunk, Token};
