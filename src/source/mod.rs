//! Random sources and their selection.
//!
//! Every backend implements the single [`FillBytes`] capability. The
//! [`ProviderInitializer`] evaluates a hardware-first preference list once
//! at startup and hands back the winning [`RandomSource`].

mod backend;
mod hardware;
mod initializer;
mod os;
mod random_source;
mod software;

pub use backend::{Backend, FillBytes, SourceError};
pub use hardware::{HardwareRng, DEFAULT_HWRNG_PATH, PROBE_TIMEOUT};
pub use initializer::{ProviderInitializer, SourceConfig};
pub use os::SystemRng;
pub use random_source::RandomSource;
pub use software::{ReseedingError, SoftwareRng};
