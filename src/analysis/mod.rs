//! Output quality checks.
//!
//! Statistical sanity tests over generated bytes, with configurable
//! acceptance thresholds. These are smoke tests, not proofs of
//! randomness.

mod statistics;
mod threshold;

pub use statistics::SampleStatistics;
pub use threshold::{QualityThresholds, ThresholdViolation};
