//! Coordinate stream client modules

pub mod client;
pub mod protocol;

pub use client::{CoordinateStream, StreamError, StreamEvent};
