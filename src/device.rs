//! The entropy device handle.
//!
//! [`EntropyDevice`] owns the active random source and the writer. It is
//! created once by initialization and threaded through callers; there is
//! no process-wide generator.

use crate::config::{DeviceConfig, DEFAULT_OUTPUT};
use crate::conditioning::HashError;
use crate::seeding::{HostObserver, Seed, SeedDeriver, SeedError};
use crate::source::{Backend, ProviderInitializer, RandomSource, SourceError};
use crate::writer::{OutputSize, StreamWriter, WriteError, WriteStats};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Path that selects standard output instead of a file.
pub const STDOUT_PATH: &str = "-";

/// Errors surfaced by the device.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("seed unavailable: {0}")]
    SeedUnavailable(#[source] SeedError),
    #[error("initialization failed: {0}")]
    InitializationFailed(#[source] SourceError),
    #[error("generation failed: {0}")]
    GenerationFailed(#[source] WriteError),
    #[error("sink error: {0}")]
    Sink(#[source] WriteError),
}

/// Discriminant of [`DeviceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedAlgorithm,
    SeedUnavailable,
    InitializationFailed,
    GenerationFailed,
    Sink,
}

impl DeviceError {
    /// Returns which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            DeviceError::SeedUnavailable(_) => ErrorKind::SeedUnavailable,
            DeviceError::InitializationFailed(_) => ErrorKind::InitializationFailed,
            DeviceError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            DeviceError::Sink(_) => ErrorKind::Sink,
        }
    }
}

impl From<WriteError> for DeviceError {
    fn from(e: WriteError) -> Self {
        if e.is_generation_failure() {
            DeviceError::GenerationFailed(e)
        } else {
            DeviceError::Sink(e)
        }
    }
}

/// An initialized (or failed) entropy device.
pub struct EntropyDevice {
    config: DeviceConfig,
    /// The active source, or the backends attempted when none could be built.
    source: Result<RandomSource, Vec<Backend>>,
    writer: StreamWriter,
}

impl EntropyDevice {
    /// Initializes a device, failing if no random source can be built.
    pub fn initialize(config: DeviceConfig) -> Result<Self, DeviceError> {
        let source = build_source(&config).map_err(DeviceError::InitializationFailed)?;
        Ok(Self {
            config,
            source: Ok(source),
            writer: StreamWriter::new(),
        })
    }

    /// Creates a device, recording an initialization failure instead of
    /// returning it.
    ///
    /// A failed device refuses every write with
    /// [`ErrorKind::InitializationFailed`] before touching the sink.
    pub fn new(config: DeviceConfig) -> Self {
        let source = build_source(&config).map_err(|e| attempted_of(&e));
        Self {
            config,
            source,
            writer: StreamWriter::new(),
        }
    }

    /// Re-runs backend selection, replacing the current source.
    pub fn reinitialize(&mut self) -> Result<(), DeviceError> {
        match build_source(&self.config) {
            Ok(source) => {
                self.source = Ok(source);
                Ok(())
            }
            Err(e) => {
                self.source = Err(attempted_of(&e));
                Err(DeviceError::InitializationFailed(e))
            }
        }
    }

    /// Returns the configuration the device was built from.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Returns true if a random source is available.
    pub fn is_ready(&self) -> bool {
        self.source.is_ok()
    }

    /// Returns the active backend, if any.
    pub fn backend(&self) -> Option<Backend> {
        self.source.as_ref().ok().map(RandomSource::backend)
    }

    /// Returns true if a derived seed was mixed into the active source.
    pub fn is_seeded(&self) -> bool {
        self.source.as_ref().map(RandomSource::is_seeded).unwrap_or(false)
    }

    /// Returns the shared write counters.
    pub fn stats(&self) -> Arc<WriteStats> {
        self.writer.stats()
    }

    /// Writes `size` random bytes to `path` (negative for unbounded).
    ///
    /// An empty path selects [`DEFAULT_OUTPUT`]; [`STDOUT_PATH`] selects
    /// standard output. Files are created or truncated, never appended.
    pub fn write(&mut self, path: impl AsRef<Path>, size: i64) -> Result<u64, DeviceError> {
        let path = resolve_path(path.as_ref());
        let size = OutputSize::from(size);
        let source = active_source(&mut self.source)?;

        tracing::info!(path = %path.display(), %size, backend = %source.backend(), "Writing random bytes");

        let written = if path.as_os_str() == STDOUT_PATH {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            self.writer.write(source, &mut lock, size)?
        } else {
            self.writer.write_to_path(source, &path, size)?
        };

        tracing::info!(written, "Write complete");
        Ok(written)
    }

    /// Writes `size` random bytes to an open sink.
    pub fn write_to<W: Write + ?Sized>(&mut self, sink: &mut W, size: i64) -> Result<u64, DeviceError> {
        let source = active_source(&mut self.source)?;
        Ok(self.writer.write(source, sink, OutputSize::from(size))?)
    }

    /// Derives a seed from the host using the configured algorithm.
    pub fn derive_seed(&self) -> Result<Seed, DeviceError> {
        derive_host_seed(&self.config.seed.algorithm)
    }
}

impl std::fmt::Debug for EntropyDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyDevice")
            .field("backend", &self.backend())
            .field("seeded", &self.is_seeded())
            .finish_non_exhaustive()
    }
}

fn build_source(config: &DeviceConfig) -> Result<RandomSource, SourceError> {
    ProviderInitializer::new(config.source.clone(), config.seed.algorithm.as_str()).initialize()
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        PathBuf::from(DEFAULT_OUTPUT)
    } else {
        path.to_path_buf()
    }
}

fn attempted_of(error: &SourceError) -> Vec<Backend> {
    match error {
        SourceError::InitializationFailed { attempted } => attempted.clone(),
        _ => Vec::new(),
    }
}

fn active_source(
    source: &mut Result<RandomSource, Vec<Backend>>,
) -> Result<&mut RandomSource, DeviceError> {
    source.as_mut().map_err(|attempted| {
        DeviceError::InitializationFailed(SourceError::InitializationFailed {
            attempted: attempted.clone(),
        })
    })
}

/// Derives a seed from the host without constructing a random source.
pub fn derive_host_seed(algorithm_id: &str) -> Result<Seed, DeviceError> {
    SeedDeriver::with_observer(HostObserver::new(), algorithm_id)
        .derive_seed()
        .map_err(|e| match e {
            SeedError::Digest(HashError::UnsupportedAlgorithm(id)) => {
                DeviceError::UnsupportedAlgorithm(id)
            }
            other => DeviceError::SeedUnavailable(other),
        })
}

/// Initializes a device from the default configuration.
pub fn initialize() -> Result<EntropyDevice, DeviceError> {
    EntropyDevice::initialize(DeviceConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{QualityThresholds, SampleStatistics};
    use crate::source::SourceConfig;

    fn software_config() -> DeviceConfig {
        DeviceConfig {
            source: SourceConfig::only(&[Backend::Software, Backend::Os]),
            ..Default::default()
        }
    }

    fn disabled_config() -> DeviceConfig {
        DeviceConfig {
            source: SourceConfig::only(&[]),
            ..Default::default()
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dev-random-device-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_write_sizes_to_file() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        let path = temp_path("sizes");

        for size in [0i64, 1, 2, 3, 4, 7, 128, 133, 512, 514] {
            let written = device.write(&path, size).unwrap();
            assert_eq!(written, size as u64);
            assert_eq!(std::fs::metadata(&path).unwrap().len(), size as u64);
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_zero_write_truncates() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        let path = temp_path("truncate");
        std::fs::write(&path, b"previous content").unwrap();

        device.write(&path, 0).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_end_to_end_133_bytes() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        let stats = device.stats();
        let path = temp_path("e2e");

        device.write(&path, 133).unwrap();

        let content = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(content.len(), 133);
        assert_eq!(stats.fills(), 34);
        assert_eq!(stats.bytes_written(), 133);
        // Not all bytes can be equal with any realistic probability.
        assert!(content.iter().any(|&b| b != content[0]));
    }

    #[test]
    fn test_output_looks_random() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        let mut sink = Vec::new();
        device.write_to(&mut sink, 64 * 1024).unwrap();

        let stats = SampleStatistics::analyze(&sink);
        assert!(QualityThresholds::default().check(&stats).is_ok(), "{:?}", stats);
    }

    #[test]
    fn test_disabled_backends_fail_initialize() {
        let result = EntropyDevice::initialize(disabled_config());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InitializationFailed);
    }

    #[test]
    fn test_failed_device_writes_nothing() {
        let mut device = EntropyDevice::new(disabled_config());
        assert!(!device.is_ready());
        assert_eq!(device.backend(), None);

        let path = temp_path("never-created");
        let _ = std::fs::remove_file(&path);

        let err = device.write(&path, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InitializationFailed);
        assert!(!path.exists());

        let mut sink = Vec::new();
        let err = device.write_to(&mut sink, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InitializationFailed);
        assert_eq!(device.stats().requests(), 0);
    }

    #[test]
    fn test_reinitialize() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        assert!(device.reinitialize().is_ok());
        assert!(device.is_ready());

        let mut failed = EntropyDevice::new(disabled_config());
        assert_eq!(
            failed.reinitialize().unwrap_err().kind(),
            ErrorKind::InitializationFailed
        );
    }

    #[test]
    fn test_open_failure_is_sink_error() {
        let mut device = EntropyDevice::initialize(software_config()).unwrap();
        let err = device.write("/nonexistent/dev-random-test/out.bin", 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Sink);
    }

    #[test]
    fn test_unsupported_algorithm() {
        let mut config = software_config();
        config.seed.algorithm = "MD5".into();

        // Seeding is skipped, the device still works.
        let device = EntropyDevice::initialize(config).unwrap();
        assert!(!device.is_seeded());

        let err = device.derive_seed().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn test_host_seed_needs_no_source() {
        assert_eq!(
            derive_host_seed("MD5").unwrap_err().kind(),
            ErrorKind::UnsupportedAlgorithm
        );

        #[cfg(target_os = "linux")]
        assert_eq!(derive_host_seed("SHA-512").unwrap().len(), 64);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_software_backend_is_seeded() {
        let device = EntropyDevice::initialize(DeviceConfig {
            source: SourceConfig::only(&[Backend::Software]),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(device.backend(), Some(Backend::Software));
        assert!(device.is_seeded());
        assert_eq!(device.derive_seed().unwrap().len(), 32);
    }

    #[test]
    fn test_empty_path_resolves_to_default() {
        assert_eq!(resolve_path(Path::new("")), PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(resolve_path(Path::new("out.bin")), PathBuf::from("out.bin"));
    }
}
