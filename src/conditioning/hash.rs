//! Digest algorithms and the hash chain used for seed whitening.
//!
//! Algorithms are selected by a textual identifier so configuration files
//! and the CLI can name them. Unknown identifiers are rejected with
//! [`HashError::UnsupportedAlgorithm`] rather than silently defaulted.

use blake3::Hasher as Blake3Hasher;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of the default digest algorithm.
pub const DEFAULT_ALGORITHM: &str = "SHA-256";

/// Errors that can occur while resolving or running a digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("unsupported digest algorithm: {0:?}")]
    UnsupportedAlgorithm(String),
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256 - the conventional choice, 32-byte output.
    #[default]
    Sha256,
    /// SHA-512 - 64-byte output.
    Sha512,
    /// BLAKE3 - fast, 32-byte output.
    Blake3,
}

impl HashAlgorithm {
    /// Canonical identifier, as accepted by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Digest output width in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Hashes `input` with this algorithm.
    pub fn digest(&self, input: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(input).to_vec(),
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                hasher.update(input);
                hasher.finalize().as_bytes().to_vec()
            }
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    /// Matching ignores ASCII case as well as `-` and `_`, so `sha256`,
    /// `SHA-256` and `sha_256` all resolve to the same algorithm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(HashError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Hashes `input` with the algorithm named by `algorithm_id`.
pub fn digest(algorithm_id: &str, input: &[u8]) -> Result<Vec<u8>, HashError> {
    let algorithm: HashAlgorithm = algorithm_id.parse()?;
    Ok(algorithm.digest(input))
}

/// Returns `a` followed by `b`, with no separator.
pub fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// A digest bound to one algorithm.
///
/// Both operations are pure: identical input always yields identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashChain {
    algorithm: HashAlgorithm,
}

impl HashChain {
    /// Creates a chain over the given algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resolves `algorithm_id` and creates a chain over it.
    pub fn from_id(algorithm_id: &str) -> Result<Self, HashError> {
        Ok(Self::new(algorithm_id.parse()?))
    }

    /// Returns the bound algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hashes `input`.
    #[inline]
    pub fn hash(&self, input: &[u8]) -> Vec<u8> {
        self.algorithm.digest(input)
    }

    /// Hashes the concatenation of `a` and `b`.
    pub fn hash_pair(&self, a: &[u8], b: &[u8]) -> Vec<u8> {
        self.hash(&concat(a, b))
    }
}
