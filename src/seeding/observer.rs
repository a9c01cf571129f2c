//! System observations used as supplementary seed input.
//!
//! This module provides a trait-based abstraction over the host readings,
//! allowing the real host to be swapped for deterministic or failing
//! observers in tests.

use std::cell::Cell;
use thiserror::Error;

/// Errors that can occur while reading a system observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("wall clock unavailable: {0}")]
    Clock(String),
    #[error("memory usage unavailable: {0}")]
    Memory(String),
    #[error("memory usage counter not supported on this platform")]
    Unsupported,
}

/// Source of the two time-varying observations mixed into a seed.
pub trait SystemObserver {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn wall_clock_millis(&self) -> Result<i64, ObservationError>;

    /// Live memory usage of this process in bytes.
    fn heap_used_bytes(&self) -> Result<u64, ObservationError>;
}

impl<O: SystemObserver + ?Sized> SystemObserver for &O {
    fn wall_clock_millis(&self) -> Result<i64, ObservationError> {
        (**self).wall_clock_millis()
    }

    fn heap_used_bytes(&self) -> Result<u64, ObservationError> {
        (**self).heap_used_bytes()
    }
}

/// Observer backed by the running host.
///
/// On Linux the memory reading is the resident set size plus the bytes
/// this process has read through `read(2)` (`rchar` in `/proc/self/io`).
/// Resident size moves in whole pages; the read counter moves on every
/// observation, since taking one reads procfs. Hosts without `/proc`
/// report [`ObservationError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HostObserver;

impl HostObserver {
    pub fn new() -> Self {
        Self
    }
}

impl SystemObserver for HostObserver {
    fn wall_clock_millis(&self) -> Result<i64, ObservationError> {
        Ok(chrono::Utc::now().timestamp_millis())
    }

    #[cfg(target_os = "linux")]
    fn heap_used_bytes(&self) -> Result<u64, ObservationError> {
        let status = std::fs::read_to_string("/proc/self/status")
            .map_err(|e| ObservationError::Memory(e.to_string()))?;
        let resident = parse_vm_rss(&status)?;

        let read = match std::fs::read_to_string("/proc/self/io") {
            Ok(io) => parse_field(&io, "rchar:")?,
            Err(e) => {
                tracing::debug!(error = %e, "Read counter unavailable, using resident size alone");
                0
            }
        };

        resident
            .checked_add(read)
            .ok_or_else(|| ObservationError::Memory("memory reading overflows u64".into()))
    }

    #[cfg(not(target_os = "linux"))]
    fn heap_used_bytes(&self) -> Result<u64, ObservationError> {
        Err(ObservationError::Unsupported)
    }
}

/// Extracts `VmRSS` (reported in kB) from `/proc/<pid>/status` content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Result<u64, ObservationError> {
    parse_field(status, "VmRSS:")?
        .checked_mul(1024)
        .ok_or_else(|| ObservationError::Memory("VmRSS out of range".into()))
}

/// Reads the first number following `key` in procfs `key: value` content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_field(content: &str, key: &str) -> Result<u64, ObservationError> {
    let line = content
        .lines()
        .find(|line| line.starts_with(key))
        .ok_or_else(|| ObservationError::Memory(format!("{} missing", key)))?;

    line[key.len()..]
        .split_whitespace()
        .next()
        .ok_or_else(|| ObservationError::Memory(format!("empty {} field", key)))?
        .parse()
        .map_err(|e: std::num::ParseIntError| ObservationError::Memory(e.to_string()))
}

/// Scripted observer for tests and demonstrations.
///
/// Each call to [`SystemObserver::heap_used_bytes`] advances the reported
/// usage by `heap_step`, imitating an allocating process.
#[derive(Debug, Default)]
pub struct MockObserver {
    millis: i64,
    heap: Cell<u64>,
    heap_step: u64,
    fail_clock: bool,
    fail_heap: bool,
}

impl MockObserver {
    /// Creates an observer reporting fixed values.
    pub fn new(millis: i64, heap: u64) -> Self {
        Self {
            millis,
            heap: Cell::new(heap),
            ..Default::default()
        }
    }

    /// Advances the heap reading by `step` bytes after every read.
    pub fn with_heap_step(mut self, step: u64) -> Self {
        self.heap_step = step;
        self
    }

    /// Makes clock reads fail.
    pub fn failing_clock(mut self) -> Self {
        self.fail_clock = true;
        self
    }

    /// Makes memory reads fail.
    pub fn failing_heap(mut self) -> Self {
        self.fail_heap = true;
        self
    }
}

impl SystemObserver for MockObserver {
    fn wall_clock_millis(&self) -> Result<i64, ObservationError> {
        if self.fail_clock {
            return Err(ObservationError::Clock("mock clock disabled".into()));
        }
        Ok(self.millis)
    }

    fn heap_used_bytes(&self) -> Result<u64, ObservationError> {
        if self.fail_heap {
            return Err(ObservationError::Memory("mock heap disabled".into()));
        }
        let current = self.heap.get();
        self.heap.set(current.wrapping_add(self.heap_step));
        Ok(current)
    }
}
