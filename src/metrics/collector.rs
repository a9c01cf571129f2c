//! Metrics collection and registry.

use crate::source::Backend;
use crate::writer::WriteStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A point-in-time view of device state.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Active backend, if the device initialized.
    pub backend: Option<Backend>,
    /// Whether a derived seed was mixed into the source.
    pub seeded: bool,
    /// Write requests started.
    pub write_requests: u64,
    /// Write requests that failed.
    pub write_failures: u64,
    /// Bytes written to sinks.
    pub bytes_written: u64,
    /// Source fill calls.
    pub fill_calls: u64,
}

impl MetricsSnapshot {
    /// Captures the current counters.
    pub fn capture(stats: &WriteStats, backend: Option<Backend>, seeded: bool) -> Self {
        Self {
            backend,
            seeded,
            write_requests: stats.requests(),
            write_failures: stats.failures(),
            bytes_written: stats.bytes_written(),
            fill_calls: stats.fills(),
        }
    }

    /// Captures the state of a device.
    pub fn from_device(device: &crate::EntropyDevice) -> Self {
        Self::capture(&device.stats(), device.backend(), device.is_seeded())
    }
}

/// Prometheus metrics registry for the device.
pub struct MetricsRegistry {
    registry: Registry,

    active_backend: IntGauge,
    seeded: IntGauge,

    write_requests_total: IntCounter,
    write_failures_total: IntCounter,
    bytes_written_total: IntCounter,
    fill_calls_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a registry with all device metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let active_backend = IntGauge::new(
            "dev_random_active_backend",
            "Active random backend (0=none, 1=hardware, 2=software, 3=os)",
        )?;
        let seeded = IntGauge::new(
            "dev_random_seeded",
            "Whether a derived seed was mixed into the active source (1=yes)",
        )?;
        let write_requests_total = IntCounter::new(
            "dev_random_write_requests_total",
            "Total write requests started",
        )?;
        let write_failures_total = IntCounter::new(
            "dev_random_write_failures_total",
            "Total write requests that ended in an error",
        )?;
        let bytes_written_total = IntCounter::new(
            "dev_random_bytes_written_total",
            "Total random bytes written to sinks",
        )?;
        let fill_calls_total = IntCounter::new(
            "dev_random_fill_calls_total",
            "Total random source fill calls",
        )?;

        registry.register(Box::new(active_backend.clone()))?;
        registry.register(Box::new(seeded.clone()))?;
        registry.register(Box::new(write_requests_total.clone()))?;
        registry.register(Box::new(write_failures_total.clone()))?;
        registry.register(Box::new(bytes_written_total.clone()))?;
        registry.register(Box::new(fill_calls_total.clone()))?;

        Ok(Self {
            registry,
            active_backend,
            seeded,
            write_requests_total,
            write_failures_total,
            bytes_written_total,
            fill_calls_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.active_backend
            .set(snapshot.backend.map(|b| b.code()).unwrap_or(0));
        self.seeded.set(i64::from(snapshot.seeded));

        // Counters only move forward; apply the difference.
        advance(&self.write_requests_total, snapshot.write_requests);
        advance(&self.write_failures_total, snapshot.write_failures);
        advance(&self.bytes_written_total, snapshot.bytes_written);
        advance(&self.fill_calls_total, snapshot.fill_calls);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}
