#![warn(clippy::pedantic)]

pub mod record;

pub use record::Record;
