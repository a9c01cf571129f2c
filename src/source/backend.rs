//! Backend identifiers and the shared fill capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by random sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{backend} backend unavailable: {reason}")]
    Construction { backend: Backend, reason: String },
    #[error("{backend} backend failed to generate bytes: {reason}")]
    Generation { backend: Backend, reason: String },
    #[error("no random source could be initialized (attempted: {})", format_attempted(.attempted))]
    InitializationFailed { attempted: Vec<Backend> },
}

fn format_attempted(attempted: &[Backend]) -> String {
    if attempted.is_empty() {
        return "none enabled".to_string();
    }
    attempted
        .iter()
        .map(Backend::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Selectable random-source backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Kernel-exposed hardware generator (`/dev/hwrng`).
    Hardware,
    /// ChaCha20 generator keyed from the OS, reseedable.
    Software,
    /// The operating system generator, used directly.
    Os,
}

impl Backend {
    /// Initialization preference order. Hardware always comes first.
    pub const PREFERENCE: [Backend; 3] = [Backend::Hardware, Backend::Software, Backend::Os];

    /// Lowercase name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Hardware => "hardware",
            Backend::Software => "software",
            Backend::Os => "os",
        }
    }

    /// Numeric code exported by the metrics gauge (0 is reserved for none).
    pub fn code(&self) -> i64 {
        match self {
            Backend::Hardware => 1,
            Backend::Software => 2,
            Backend::Os => 3,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hardware" | "hwrng" => Ok(Backend::Hardware),
            "software" | "chacha" | "chacha20" => Ok(Backend::Software),
            "os" | "system" => Ok(Backend::Os),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// The one capability every random source provides.
pub trait FillBytes {
    /// Fills `dest` completely with unpredictable bytes.
    ///
    /// A failure is reported once and never retried internally.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError>;
}

impl<F: FillBytes + ?Sized> FillBytes for &mut F {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        (**self).fill(dest)
    }
}

impl<F: FillBytes + ?Sized> FillBytes for Box<F> {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        (**self).fill(dest)
    }
}
