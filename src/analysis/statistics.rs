//! Statistical sanity checks on generated output.
//!
//! These tests detect gross failures (stuck sources, constant output,
//! truncated streams), not subtle weaknesses. Passing them is necessary
//! but not sufficient for good randomness.

/// Statistics over a byte sample.
#[derive(Debug, Clone)]
pub struct SampleStatistics {
    /// Fraction of set bits minus 0.5, in [-0.5, 0.5].
    pub bit_bias: f64,
    /// Byte-level variance (uniform bytes give about 5461).
    pub variance: f64,
    /// Lag-1 autocorrelation.
    pub autocorrelation: f64,
    /// Pearson chi-square of the byte histogram against uniform (255 dof).
    pub chi_square: f64,
    /// Number of bytes analyzed.
    pub sample_size: usize,
}

impl SampleStatistics {
    /// Runs all statistics on `data`.
    pub fn analyze(data: &[u8]) -> Self {
        Self {
            bit_bias: bit_bias(data),
            variance: variance(data),
            autocorrelation: autocorrelation(data),
            chi_square: chi_square(data),
            sample_size: data.len(),
        }
    }
}

fn bit_bias(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let ones: u64 = data.iter().map(|b| u64::from(b.count_ones())).sum();
    ones as f64 / (data.len() as f64 * 8.0) - 0.5
}

fn mean(data: &[u8]) -> f64 {
    data.iter().map(|&b| f64::from(b)).sum::<f64>() / data.len() as f64
}

fn variance(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mean = mean(data);
    data.iter().map(|&b| (f64::from(b) - mean).powi(2)).sum::<f64>() / data.len() as f64
}

fn autocorrelation(data: &[u8]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let mean = mean(data);
    let total: f64 = data.iter().map(|&b| (f64::from(b) - mean).powi(2)).sum();

    if total == 0.0 {
        return 1.0; // constant input
    }

    let covariance: f64 = data
        .windows(2)
        .map(|w| (f64::from(w[0]) - mean) * (f64::from(w[1]) - mean))
        .sum();

    covariance / total
}

fn chi_square(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &b in data {
        histogram[b as usize] += 1;
    }

    let expected = data.len() as f64 / 256.0;
    histogram
        .iter()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_pattern_has_variance() {
        let data: Vec<u8> = (0..1000).map(|i| (i * 17 + 31) as u8).collect();
        let stats = SampleStatistics::analyze(&data);
        assert!(stats.variance > 100.0);
    }

    #[test]
    fn test_constant_data() {
        let stats = SampleStatistics::analyze(&[0x80u8; 1000]);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.autocorrelation, 1.0);
    }

    #[test]
    fn test_bit_bias_extremes() {
        assert!((SampleStatistics::analyze(&[0xFF; 100]).bit_bias - 0.5).abs() < 1e-9);
        assert!((SampleStatistics::analyze(&[0x00; 100]).bit_bias + 0.5).abs() < 1e-9);
        assert!(SampleStatistics::analyze(&[0xAA; 100]).bit_bias.abs() < 1e-9);
    }

    #[test]
    fn test_chi_square_of_flat_histogram_is_zero() {
        let data: Vec<u8> = (0..=255u8).cycle().take(256 * 8).collect();
        assert!(SampleStatistics::analyze(&data).chi_square.abs() < 1e-9);
    }

    #[test]
    fn test_empty_sample() {
        let stats = SampleStatistics::analyze(&[]);
        assert_eq!(stats.sample_size, 0);
        assert_eq!(stats.bit_bias, 0.0);
        assert_eq!(stats.chi_square, 0.0);
    }
}
