//! ChaCha20 software generator with seed mixing.
//!
//! # Seeding Model
//!
//! The generator is keyed from OS entropy at construction. Derived seeds
//! are mixed in with BLAKE3 over:
//! - a domain separator and the reseed counter
//! - the retained seed material
//! - the new seed
//!
//! A weak or predictable derived seed therefore cannot reduce the
//! strength of the OS keying; it can only add to it.

use super::backend::{Backend, FillBytes, SourceError};
use crate::seeding::Seed;
use blake3::Hasher;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use thiserror::Error;

/// Domain separator for seed mixing.
const RESEED_DOMAIN: &[u8] = b"dev-random-software-reseed-v1";

/// Errors that can occur during reseeding.
#[derive(Debug, Error)]
pub enum ReseedingError {
    #[error("seed is empty")]
    EmptySeed,
}

/// A reseedable CSPRNG backed by ChaCha20.
///
/// Not thread-safe: generation mutates the ChaCha state and requires
/// `&mut self`.
pub struct SoftwareRng {
    /// The underlying ChaCha20 CSPRNG.
    inner: ChaCha20Rng,
    /// Retained key material mixed into every reseed.
    /// This is NOT the ChaCha internal state.
    seed_material: [u8; 32],
    reseed_count: u64,
    bytes_since_reseed: u64,
}

impl SoftwareRng {
    /// Creates a generator keyed from the OS entropy source.
    ///
    /// Fails instead of panicking when the OS refuses to provide entropy.
    pub fn from_os_entropy() -> Result<Self, SourceError> {
        let mut seed_material = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed_material)
            .map_err(|e| SourceError::Construction {
                backend: Backend::Software,
                reason: format!("OS keying failed: {}", e),
            })?;

        Ok(Self::from_key(seed_material))
    }

    fn from_key(seed_material: [u8; 32]) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(seed_material),
            seed_material,
            reseed_count: 0,
            bytes_since_reseed: 0,
        }
    }

    /// Creates a generator from a known key (for testing only).
    #[cfg(test)]
    pub(crate) fn from_key_for_testing(key: [u8; 32]) -> Self {
        Self::from_key(key)
    }

    /// Mixes a derived seed into the generator.
    pub fn reseed(&mut self, seed: &Seed) -> Result<(), ReseedingError> {
        if seed.is_empty() {
            return Err(ReseedingError::EmptySeed);
        }

        // new_key = BLAKE3(domain || counter || old_key || seed)
        let mut hasher = Hasher::new();
        hasher.update(RESEED_DOMAIN);
        hasher.update(&self.reseed_count.to_le_bytes());
        hasher.update(&self.seed_material);
        hasher.update(seed.as_bytes());

        let new_seed_material: [u8; 32] = *hasher.finalize().as_bytes();

        self.seed_material = new_seed_material;
        self.inner = ChaCha20Rng::from_seed(new_seed_material);
        self.reseed_count += 1;
        self.bytes_since_reseed = 0;

        tracing::info!(
            reseed_count = self.reseed_count,
            seed_len = seed.len(),
            "Software generator reseeded via BLAKE3 mixing"
        );

        Ok(())
    }

    /// Returns the number of reseeds performed.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Returns bytes generated since the last reseed.
    pub fn bytes_since_reseed(&self) -> u64 {
        self.bytes_since_reseed
    }
}

impl std::fmt::Debug for SoftwareRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareRng")
            .field("reseed_count", &self.reseed_count)
            .field("bytes_since_reseed", &self.bytes_since_reseed)
            .finish_non_exhaustive()
    }
}

impl FillBytes for SoftwareRng {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        self.inner
            .try_fill_bytes(dest)
            .map_err(|e| SourceError::Generation {
                backend: Backend::Software,
                reason: e.to_string(),
            })?;
        self.bytes_since_reseed += dest.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_seed(byte: u8) -> Seed {
        Seed::from_bytes(vec![byte; 32])
    }

    #[test]
    fn test_reseed_increments_count() {
        let mut rng = SoftwareRng::from_os_entropy().unwrap();
        assert_eq!(rng.reseed_count(), 0);

        rng.reseed(&make_seed(0x42)).unwrap();
        assert_eq!(rng.reseed_count(), 1);
    }

    #[test]
    fn test_empty_seed_rejected() {
        let mut rng = SoftwareRng::from_os_entropy().unwrap();
        let result = rng.reseed(&Seed::from_bytes(Vec::new()));

        assert!(matches!(result, Err(ReseedingError::EmptySeed)));
        assert_eq!(rng.reseed_count(), 0);
    }

    #[test]
    fn test_bytes_since_reseed_tracking() {
        let mut rng = SoftwareRng::from_os_entropy().unwrap();

        let mut buf = [0u8; 100];
        rng.fill(&mut buf).unwrap();
        assert_eq!(rng.bytes_since_reseed(), 100);

        rng.reseed(&make_seed(1)).unwrap();
        assert_eq!(rng.bytes_since_reseed(), 0);
    }

    #[test]
    fn test_reseed_changes_output() {
        let key = [0x01u8; 32];
        let mut rng1 = SoftwareRng::from_key_for_testing(key);
        let mut rng2 = SoftwareRng::from_key_for_testing(key);

        let mut out1 = [0u8; 32];
        let mut out2 = [0u8; 32];
        rng1.fill(&mut out1).unwrap();
        rng2.fill(&mut out2).unwrap();
        assert_eq!(out1, out2);

        rng1.reseed(&make_seed(0xAB)).unwrap();

        rng1.fill(&mut out1).unwrap();
        rng2.fill(&mut out2).unwrap();
        assert_ne!(out1, out2);
    }

    #[test]
    fn test_reseed_counter_affects_output() {
        let key = [0x01u8; 32];
        let mut rng1 = SoftwareRng::from_key_for_testing(key);
        let mut rng2 = SoftwareRng::from_key_for_testing(key);

        rng1.reseed(&make_seed(0xAA)).unwrap();
        rng2.reseed(&make_seed(0x00)).unwrap();
        rng2.reseed(&make_seed(0xAA)).unwrap();

        let mut out1 = [0u8; 32];
        let mut out2 = [0u8; 32];
        rng1.fill(&mut out1).unwrap();
        rng2.fill(&mut out2).unwrap();

        assert_ne!(out1, out2);
    }

    #[test]
    fn test_accepts_wide_seed() {
        let mut rng = SoftwareRng::from_os_entropy().unwrap();
        rng.reseed(&Seed::from_bytes(vec![0x5A; 64])).unwrap();
        assert_eq!(rng.reseed_count(), 1);
    }
}
