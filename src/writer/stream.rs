//! The buffered output loop.
//!
//! # Size regimes
//!
//! - **Unbounded**: fill and write the full working buffer forever. The
//!   loop has no normal exit; it ends when a fill or a sink write fails.
//! - **Exact(0)**: no fills, no writes. A path sink is still created or
//!   truncated.
//! - **Exact(n)**: full-width chunks while at least [`BUFFER_WIDTH`] bytes
//!   remain, then one chunk sized exactly to the remainder.

use super::stats::WriteStats;
use crate::source::{FillBytes, SourceError};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Width of the reusable working buffer.
pub const BUFFER_WIDTH: usize = 4;

/// Errors that can occur while writing a stream.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to open sink {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sink write failed after {written} bytes: {source}")]
    Write {
        written: u64,
        #[source]
        source: io::Error,
    },
    #[error("sink flush failed: {0}")]
    Flush(#[source] io::Error),
    #[error("random generation failed after {written} bytes: {source}")]
    Fill {
        written: u64,
        #[source]
        source: SourceError,
    },
}

impl WriteError {
    /// Returns true if the failure came from the random source rather
    /// than the sink.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, WriteError::Fill { .. })
    }
}

/// Requested output length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Write until externally stopped.
    Unbounded,
    /// Write exactly this many bytes.
    Exact(u64),
}

impl From<i64> for OutputSize {
    /// Negative sizes mean unbounded.
    fn from(size: i64) -> Self {
        if size < 0 {
            OutputSize::Unbounded
        } else {
            OutputSize::Exact(size as u64)
        }
    }
}

impl std::fmt::Display for OutputSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputSize::Unbounded => f.write_str("unbounded"),
            OutputSize::Exact(n) => write!(f, "{} bytes", n),
        }
    }
}

/// Writes random byte streams to sinks.
#[derive(Debug, Clone, Default)]
pub struct StreamWriter {
    stats: Arc<WriteStats>,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer reporting into existing counters.
    pub fn with_stats(stats: Arc<WriteStats>) -> Self {
        Self { stats }
    }

    /// Returns the shared counters.
    pub fn stats(&self) -> Arc<WriteStats> {
        Arc::clone(&self.stats)
    }

    /// Writes to the file at `path`, creating or truncating it first.
    ///
    /// The file handle is released on every exit path. Bytes written
    /// before an error stay in the file.
    pub fn write_to_path<S>(&self, source: &mut S, path: &Path, size: OutputSize) -> Result<u64, WriteError>
    where
        S: FillBytes + ?Sized,
    {
        let mut file = match File::create(path) {
            Ok(file) => file,
            Err(source) => {
                self.stats.record_request();
                self.stats.record_failure();
                return Err(WriteError::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        tracing::debug!(path = %path.display(), %size, "Sink opened");
        self.write(source, &mut file, size)
    }

    /// Writes to an already-open sink.
    ///
    /// Returns the number of bytes written. In unbounded mode this only
    /// returns on error.
    pub fn write<S, W>(&self, source: &mut S, sink: &mut W, size: OutputSize) -> Result<u64, WriteError>
    where
        S: FillBytes + ?Sized,
        W: Write + ?Sized,
    {
        self.stats.record_request();

        let result = match size {
            OutputSize::Unbounded => self.write_unbounded(source, sink),
            OutputSize::Exact(n) => self.write_exact(source, sink, n),
        };

        match &result {
            Ok(written) => tracing::debug!(written, "Write request completed"),
            Err(e) => {
                self.stats.record_failure();
                tracing::debug!(error = %e, "Write request failed");
            }
        }

        result
    }

    fn write_unbounded<S, W>(&self, source: &mut S, sink: &mut W) -> Result<u64, WriteError>
    where
        S: FillBytes + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = [0u8; BUFFER_WIDTH];
        let mut written = 0u64;

        loop {
            self.write_chunk(source, sink, &mut buf, written)?;
            written += BUFFER_WIDTH as u64;
        }
    }

    fn write_exact<S, W>(&self, source: &mut S, sink: &mut W, size: u64) -> Result<u64, WriteError>
    where
        S: FillBytes + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = [0u8; BUFFER_WIDTH];
        let mut written = 0u64;

        while written < size {
            let remaining = size - written;
            let chunk = remaining.min(BUFFER_WIDTH as u64) as usize;
            self.write_chunk(source, sink, &mut buf[..chunk], written)?;
            written += chunk as u64;
        }

        sink.flush().map_err(WriteError::Flush)?;
        Ok(written)
    }

    #[inline]
    fn write_chunk<S, W>(&self, source: &mut S, sink: &mut W, chunk: &mut [u8], written: u64) -> Result<(), WriteError>
    where
        S: FillBytes + ?Sized,
        W: Write + ?Sized,
    {
        self.stats.record_fill();
        source
            .fill(chunk)
            .map_err(|source| WriteError::Fill { written, source })?;

        sink.write_all(chunk)
            .map_err(|source| WriteError::Write { written, source })?;
        self.stats.record_bytes(chunk.len());

        tracing::trace!(chunk = chunk.len(), written, "Chunk written");
        Ok(())
    }
}
