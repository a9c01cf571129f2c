//! Hash-chain conditioning of system observations.
//!
//! This module wraps the digest algorithms used to whiten raw,
//! low-quality observations (clock readings, memory counters) before
//! they are mixed into seed material.

mod encoding;
mod hash;

pub use encoding::minimal_be_bytes;
pub use hash::{concat, digest, HashAlgorithm, HashChain, HashError, DEFAULT_ALGORITHM};
