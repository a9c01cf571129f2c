//! Pass/fail thresholds for output statistics.

use super::statistics::SampleStatistics;
use serde::{Deserialize, Serialize};

/// Acceptance limits for [`SampleStatistics`].
///
/// Defaults are calibrated for samples of 64 KiB and up; smaller samples
/// need [`QualityThresholds::permissive`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Maximum acceptable bit bias (absolute value).
    pub max_bit_bias: f64,
    /// Minimum acceptable byte variance.
    pub min_variance: f64,
    /// Maximum acceptable autocorrelation (absolute value).
    pub max_autocorrelation: f64,
    /// Maximum acceptable byte chi-square.
    pub max_chi_square: f64,
    /// Smallest sample the limits apply to.
    pub min_sample_size: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_bit_bias: 0.01,
            min_variance: 4000.0,
            max_autocorrelation: 0.05,
            max_chi_square: 400.0,
            min_sample_size: 64 * 1024,
        }
    }
}

impl QualityThresholds {
    /// Tighter limits for large samples (1 MiB and up).
    pub fn conservative() -> Self {
        Self {
            max_bit_bias: 0.002,
            min_variance: 5200.0,
            max_autocorrelation: 0.01,
            max_chi_square: 350.0,
            min_sample_size: 1024 * 1024,
        }
    }

    /// Loose limits for small samples.
    pub fn permissive() -> Self {
        Self {
            max_bit_bias: 0.1,
            min_variance: 1000.0,
            max_autocorrelation: 0.3,
            max_chi_square: f64::INFINITY,
            min_sample_size: 128,
        }
    }

    /// Checks statistics against the limits.
    pub fn check(&self, stats: &SampleStatistics) -> Result<(), ThresholdViolation> {
        if stats.sample_size < self.min_sample_size {
            return Err(ThresholdViolation::SampleTooSmall {
                observed: stats.sample_size,
                required: self.min_sample_size,
            });
        }

        if stats.bit_bias.abs() > self.max_bit_bias {
            return Err(ThresholdViolation::BitBias {
                observed: stats.bit_bias,
                threshold: self.max_bit_bias,
            });
        }

        if stats.variance < self.min_variance {
            return Err(ThresholdViolation::LowVariance {
                observed: stats.variance,
                threshold: self.min_variance,
            });
        }

        if stats.autocorrelation.abs() > self.max_autocorrelation {
            return Err(ThresholdViolation::HighAutocorrelation {
                observed: stats.autocorrelation,
                threshold: self.max_autocorrelation,
            });
        }

        if stats.chi_square > self.max_chi_square {
            return Err(ThresholdViolation::ChiSquare {
                observed: stats.chi_square,
                threshold: self.max_chi_square,
            });
        }

        Ok(())
    }
}

/// Threshold violation types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThresholdViolation {
    #[error("sample of {observed} bytes is below the {required}-byte minimum")]
    SampleTooSmall { observed: usize, required: usize },

    #[error("bit bias {observed:.4} exceeds threshold {threshold:.4}")]
    BitBias { observed: f64, threshold: f64 },

    #[error("variance {observed:.2} below threshold {threshold:.2}")]
    LowVariance { observed: f64, threshold: f64 },

    #[error("autocorrelation {observed:.4} exceeds threshold {threshold:.4}")]
    HighAutocorrelation { observed: f64, threshold: f64 },

    #[error("chi-square {observed:.1} exceeds threshold {threshold:.1}")]
    ChiSquare { observed: f64, threshold: f64 },
}
