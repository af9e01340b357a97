//! Async transport for BER elements
//!
//! This crate reads and writes whole BER elements over tokio byte streams
//! (TCP sockets, pipes, in-memory duplex streams).

pub mod reader;
pub mod stream;

pub use reader::AsyncElementReader;
pub use stream::{BerStream, ElementStream};
