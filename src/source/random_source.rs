//! The active random source.

use super::backend::{Backend, FillBytes, SourceError};
use super::hardware::HardwareRng;
use super::os::SystemRng;
use super::software::SoftwareRng;

/// A constructed random source, exactly one backend variant.
///
/// `Send`, but fills take `&mut self`: the handle has a single owner and
/// is not shared between callers.
#[derive(Debug)]
pub enum RandomSource {
    Hardware(HardwareRng),
    Software(SoftwareRng),
    Os(SystemRng),
}

impl RandomSource {
    /// Returns which backend this source uses.
    pub fn backend(&self) -> Backend {
        match self {
            RandomSource::Hardware(_) => Backend::Hardware,
            RandomSource::Software(_) => Backend::Software,
            RandomSource::Os(_) => Backend::Os,
        }
    }

    /// Returns true if a derived seed has been mixed into this source.
    ///
    /// Only the software backend accepts explicit seeding.
    pub fn is_seeded(&self) -> bool {
        match self {
            RandomSource::Software(rng) => rng.reseed_count() > 0,
            _ => false,
        }
    }
}

impl FillBytes for RandomSource {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        match self {
            RandomSource::Hardware(rng) => rng.fill(dest),
            RandomSource::Software(rng) => rng.fill(dest),
            RandomSource::Os(rng) => rng.fill(dest),
        }
    }
}

impl From<HardwareRng> for RandomSource {
    fn from(rng: HardwareRng) -> Self {
        RandomSource::Hardware(rng)
    }
}

impl From<SoftwareRng> for RandomSource {
    fn from(rng: SoftwareRng) -> Self {
        RandomSource::Software(rng)
    }
}

impl From<SystemRng> for RandomSource {
    fn from(rng: SystemRng) -> Self {
        RandomSource::Os(rng)
    }
}
