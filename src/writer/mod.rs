//! Byte-exact output of random streams.
//!
//! A single size-regime state machine covers unbounded, empty, and
//! exact-length requests, refilling a small fixed working buffer.

mod stats;
mod stream;

pub use stats::WriteStats;
pub use stream::{OutputSize, StreamWriter, WriteError, BUFFER_WIDTH};
