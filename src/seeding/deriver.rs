//! Seed derivation from system observations.
//!
//! The clock and memory readings are each whitened by a separate hash and
//! the two digests are then hashed together:
//!
//! ```text
//! h1   = H(enc(wall_clock_millis))
//! h2   = H(enc(heap_used_bytes))
//! seed = H(h1 || h2)
//! ```
//!
//! `enc` is the minimal big-endian two's-complement encoding. The result
//! is a best-effort supplement for software generators, never a primary
//! entropy source.

use super::observer::{HostObserver, ObservationError, SystemObserver};
use crate::conditioning::{minimal_be_bytes, HashChain, HashError, DEFAULT_ALGORITHM};
use thiserror::Error;

/// Errors that can occur during seed derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("seed digest failed: {0}")]
    Digest(#[from] HashError),
    #[error("seed observation failed: {0}")]
    Observation(#[from] ObservationError),
}

/// Derived seed material.
///
/// Immutable once created; its length equals the output width of the
/// digest that produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Returns the seed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the seed length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the seed holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex rendering, for display by the CLI.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seed")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Derives seeds by hashing system observations.
pub struct SeedDeriver<O = HostObserver> {
    observer: O,
    algorithm_id: String,
}

impl SeedDeriver<HostObserver> {
    /// Creates a deriver over the host using the default algorithm.
    pub fn new() -> Self {
        Self::with_observer(HostObserver::new(), DEFAULT_ALGORITHM)
    }
}

impl Default for SeedDeriver<HostObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: SystemObserver> SeedDeriver<O> {
    /// Creates a deriver with a custom observer and algorithm identifier.
    ///
    /// The identifier is resolved on each derivation, so an unsupported
    /// algorithm surfaces as [`SeedError::Digest`] at that point.
    pub fn with_observer(observer: O, algorithm_id: impl Into<String>) -> Self {
        Self {
            observer,
            algorithm_id: algorithm_id.into(),
        }
    }

    /// Returns the configured algorithm identifier.
    pub fn algorithm_id(&self) -> &str {
        &self.algorithm_id
    }

    /// Derives a fresh seed.
    pub fn derive_seed(&self) -> Result<Seed, SeedError> {
        let chain = HashChain::from_id(&self.algorithm_id)?;

        let millis = self.observer.wall_clock_millis()?;
        let h1 = chain.hash(&minimal_be_bytes(i128::from(millis)));

        let heap = self.observer.heap_used_bytes()?;
        let h2 = chain.hash(&minimal_be_bytes(i128::from(heap)));

        let seed = Seed::from_bytes(chain.hash_pair(&h1, &h2));

        tracing::debug!(
            algorithm = %chain.algorithm(),
            seed_len = seed.len(),
            "Derived supplementary seed"
        );

        Ok(seed)
    }
}

/// Derives a seed from the host with the default algorithm.
pub fn derive_seed() -> Result<Seed, SeedError> {
    SeedDeriver::new().derive_seed()
}
