//! Prometheus metrics for the entropy device.
//!
//! # Metrics Exposed
//!
//! - `dev_random_active_backend` - Active backend (0=none, 1=hardware, 2=software, 3=os)
//! - `dev_random_seeded` - Whether a derived seed was mixed in (1=yes)
//! - `dev_random_write_requests_total` - Write requests started
//! - `dev_random_write_failures_total` - Write requests that failed
//! - `dev_random_bytes_written_total` - Bytes written to sinks
//! - `dev_random_fill_calls_total` - Random source fill calls
//!
//! With the `metrics` feature, [`MetricsServer`] serves them over HTTP,
//! reading the device's shared counters at scrape time.
//!
//! # Example
//!
//! ```no_run
//! use dev_random::metrics::{MetricsRegistry, MetricsSnapshot};
//! use dev_random::{DeviceConfig, EntropyDevice};
//!
//! let mut device = EntropyDevice::initialize(DeviceConfig::default()).unwrap();
//! device.write("out.bin", 133).unwrap();
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot::from_device(&device));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
