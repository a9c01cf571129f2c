//! Unix-style entropy device emulator.
//!
//! Produces a stream of cryptographically strong random bytes and writes
//! it to a sink, either unbounded or truncated to an exact byte count.
//!
//! # Architecture
//!
//! ```text
//! seeding ──(hash chain)──┐
//!                         ↓
//! source (hardware → software → os) → writer → sink
//!                         ↑
//!                      device (owns source + writer)
//! ```
//!
//! # Design Principles
//!
//! - **Hardware first**: the kernel hardware RNG is preferred when present
//! - **Best-effort seeding**: derived seeds supplement OS keying of the
//!   software generator and never replace it; failures are logged, not fatal
//! - **Byte-exact output**: the sink always ends at exactly the requested
//!   length, whatever its alignment to the working buffer
//! - **No hidden globals**: the active source lives in an explicit
//!   [`EntropyDevice`] handle
//!
//! # Example
//!
//! ```no_run
//! use dev_random::{DeviceConfig, EntropyDevice};
//!
//! let mut device = EntropyDevice::initialize(DeviceConfig::default()).unwrap();
//!
//! // Exactly 133 bytes, file created or truncated.
//! device.write("out.bin", 133).unwrap();
//!
//! // Supplementary seed material from system observations.
//! let seed = device.derive_seed().unwrap();
//! println!("{}", seed.to_hex());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod conditioning;
pub mod config;
pub mod device;
pub mod metrics;
pub mod seeding;
pub mod source;
pub mod writer;

// Re-export commonly used types at crate root
pub use analysis::{QualityThresholds, SampleStatistics};
pub use conditioning::{HashAlgorithm, HashChain, HashError};
pub use config::{DeviceConfig, DEFAULT_OUTPUT};
pub use device::{derive_host_seed, initialize, DeviceError, EntropyDevice, ErrorKind};
pub use seeding::{derive_seed, Seed, SeedDeriver, SeedError};
pub use source::{Backend, FillBytes, ProviderInitializer, RandomSource, SourceConfig, SourceError};
pub use writer::{OutputSize, StreamWriter, WriteError, WriteStats, BUFFER_WIDTH};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
