//! Supplementary seed derivation.
//!
//! Mixes wall-clock time and live memory usage through a hash chain to
//! produce seed material for software generators. The observations are
//! low-entropy and partly predictable; the seed perturbs, and never
//! replaces, OS-provided keying.

mod deriver;
mod observer;

pub use deriver::{derive_seed, Seed, SeedDeriver, SeedError};
pub use observer::{HostObserver, MockObserver, ObservationError, SystemObserver};
