//! Shared write counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Progress counters updated by the writer loop.
///
/// Shared through an `Arc` with observers (metrics exporter, interrupt
/// handler) that only read.
#[derive(Debug, Default)]
pub struct WriteStats {
    requests: AtomicU64,
    failures: AtomicU64,
    bytes_written: AtomicU64,
    fills: AtomicU64,
}

impl WriteStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fill(&self) {
        self.fills.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes(&self, n: usize) {
        self.bytes_written.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Write requests started.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Write requests that ended in an error.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Bytes successfully handed to sinks.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Source fill calls made.
    pub fn fills(&self) -> u64 {
        self.fills.load(Ordering::Relaxed)
    }
}
