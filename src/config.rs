//! Device configuration.
//!
//! Loaded from TOML; every section is optional and falls back to its
//! defaults. CLI flags are applied on top by the binary.

use crate::conditioning::{HashAlgorithm, DEFAULT_ALGORITHM};
use crate::source::SourceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional output file name used when no path is given.
pub const DEFAULT_OUTPUT: &str = "dev-random";

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("hardware RNG path is empty")]
    EmptyHwrngPath,
    #[error("backend {0} listed more than once")]
    DuplicateBackend(String),
    #[error("unsupported seed algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Seed derivation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Digest algorithm identifier (e.g. `SHA-256`, `SHA-512`, `BLAKE3`).
    pub algorithm: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

/// Output defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination path; `-` writes to standard output.
    pub path: PathBuf,
    /// Bytes to write; negative for unbounded.
    pub size: i64,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            size: -1,
            metrics_port: 9090,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl DeviceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DeviceConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.hwrng_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyHwrngPath);
        }

        for (i, backend) in self.source.backends.iter().enumerate() {
            if self.source.backends[..i].contains(backend) {
                return Err(ConfigError::DuplicateBackend(backend.to_string()));
            }
        }

        self.seed
            .algorithm
            .parse::<HashAlgorithm>()
            .map_err(|_| ConfigError::UnsupportedAlgorithm(self.seed.algorithm.clone()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Backend;

    #[test]
    fn test_default_config_valid() {
        let config = DeviceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.path, PathBuf::from("dev-random"));
        assert_eq!(config.output.size, -1);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DeviceConfig::from_toml("").unwrap();
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = DeviceConfig::from_toml(
            r#"
            [source]
            backends = ["os", "software"]

            [seed]
            algorithm = "blake3"

            [output]
            size = 133
            "#,
        )
        .unwrap();

        assert_eq!(config.source.backends, vec![Backend::Os, Backend::Software]);
        assert!(config.source.seed_on_init);
        assert_eq!(config.seed.algorithm, "blake3");
        assert_eq!(config.output.size, 133);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = DeviceConfig::from_toml("[source]\nbackends = [\"rdrand\"]\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_duplicate_backend_rejected() {
        let result = DeviceConfig::from_toml("[source]\nbackends = [\"os\", \"os\"]\n");
        assert!(matches!(result, Err(ConfigError::DuplicateBackend(_))));
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let result = DeviceConfig::from_toml("[seed]\nalgorithm = \"MD5\"\n");
        assert!(matches!(result, Err(ConfigError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_empty_hwrng_path_rejected() {
        let mut config = DeviceConfig::default();
        config.source.hwrng_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHwrngPath)));
    }

    #[test]
    fn test_missing_file() {
        let result = DeviceConfig::from_file("/nonexistent/dev-random.toml");
        assert!(matches!(result, Err(ConfigError::FileReadError(_))));
    }
}
