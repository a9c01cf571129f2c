//! Backend selection with fallback.
//!
//! Enabled backends are attempted in [`Backend::PREFERENCE`] order; the
//! first to construct wins. Software sources are then seeded on a
//! best-effort basis: a seeding failure is logged and the source is kept.

use super::backend::{Backend, SourceError};
use super::hardware::{HardwareRng, DEFAULT_HWRNG_PATH};
use super::os::SystemRng;
use super::random_source::RandomSource;
use super::software::SoftwareRng;
use crate::seeding::{HostObserver, SeedDeriver, SystemObserver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Random source selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backends allowed to be constructed. Listing order is ignored.
    pub backends: Vec<Backend>,
    /// Hardware RNG device path.
    pub hwrng_path: PathBuf,
    /// Mix a derived seed into software backends after construction.
    pub seed_on_init: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backends: Backend::PREFERENCE.to_vec(),
            hwrng_path: PathBuf::from(DEFAULT_HWRNG_PATH),
            seed_on_init: true,
        }
    }
}

impl SourceConfig {
    /// Configuration with only the given backends enabled.
    pub fn only(backends: &[Backend]) -> Self {
        Self {
            backends: backends.to_vec(),
            ..Default::default()
        }
    }

    /// Enabled backends in preference order, without duplicates.
    pub fn attempt_order(&self) -> Vec<Backend> {
        Backend::PREFERENCE
            .into_iter()
            .filter(|backend| self.backends.contains(backend))
            .collect()
    }
}

/// Builds the active [`RandomSource`].
pub struct ProviderInitializer<O = HostObserver> {
    config: SourceConfig,
    deriver: SeedDeriver<O>,
}

impl ProviderInitializer<HostObserver> {
    /// Creates an initializer seeding from the host with `algorithm_id`.
    pub fn new(config: SourceConfig, algorithm_id: impl Into<String>) -> Self {
        Self::with_deriver(config, SeedDeriver::with_observer(HostObserver::new(), algorithm_id))
    }
}

impl<O: SystemObserver> ProviderInitializer<O> {
    /// Creates an initializer with a custom seed deriver.
    pub fn with_deriver(config: SourceConfig, deriver: SeedDeriver<O>) -> Self {
        Self { config, deriver }
    }

    /// Returns the selection settings.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Constructs the first available backend.
    pub fn initialize(&self) -> Result<RandomSource, SourceError> {
        let attempted = self.config.attempt_order();

        for &backend in &attempted {
            match self.construct(backend) {
                Ok(source) => {
                    tracing::info!(
                        backend = %backend,
                        seeded = source.is_seeded(),
                        "Random source initialized"
                    );
                    return Ok(source);
                }
                Err(e) => {
                    tracing::warn!(backend = %backend, error = %e, "Backend unavailable, falling back");
                }
            }
        }

        tracing::error!(?attempted, "No random source available");
        Err(SourceError::InitializationFailed { attempted })
    }

    fn construct(&self, backend: Backend) -> Result<RandomSource, SourceError> {
        match backend {
            Backend::Hardware => HardwareRng::open(&self.config.hwrng_path).map(RandomSource::from),
            Backend::Software => {
                let mut rng = SoftwareRng::from_os_entropy()?;
                if self.config.seed_on_init {
                    self.seed(&mut rng);
                }
                Ok(RandomSource::from(rng))
            }
            Backend::Os => SystemRng::new().map(RandomSource::from),
        }
    }

    /// Best-effort seeding; failures leave the OS keying in place.
    fn seed(&self, rng: &mut SoftwareRng) {
        let seed = match self.deriver.derive_seed() {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!(error = %e, "Seed unavailable, keeping OS keying");
                return;
            }
        };

        if let Err(e) = rng.reseed(&seed) {
            tracing::warn!(error = %e, "Seeding rejected, keeping OS keying");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::MockObserver;
    use crate::source::FillBytes;

    fn no_hwrng() -> SourceConfig {
        SourceConfig {
            hwrng_path: PathBuf::from("/nonexistent/dev-random-test/hwrng"),
            ..Default::default()
        }
    }

    fn initializer(config: SourceConfig, observer: MockObserver) -> ProviderInitializer<MockObserver> {
        ProviderInitializer::with_deriver(config, SeedDeriver::with_observer(observer, "SHA-256"))
    }

    #[test]
    fn test_attempt_order_ignores_listing_order() {
        let config = SourceConfig::only(&[Backend::Os, Backend::Hardware, Backend::Os]);
        assert_eq!(config.attempt_order(), vec![Backend::Hardware, Backend::Os]);
    }

    #[test]
    fn test_falls_back_to_software_and_seeds() {
        let init = initializer(no_hwrng(), MockObserver::new(1_700_000_000_000, 65536));
        let mut source = init.initialize().unwrap();

        assert_eq!(source.backend(), Backend::Software);
        assert!(source.is_seeded());

        let mut buf = [0u8; 16];
        source.fill(&mut buf).unwrap();
    }

    #[test]
    fn test_seed_failure_is_not_fatal() {
        let init = initializer(no_hwrng(), MockObserver::new(1, 2).failing_heap());
        let source = init.initialize().unwrap();

        assert_eq!(source.backend(), Backend::Software);
        assert!(!source.is_seeded());
    }

    #[test]
    fn test_unsupported_seed_algorithm_is_not_fatal() {
        let deriver = SeedDeriver::with_observer(MockObserver::new(1, 2), "MD5");
        let init = ProviderInitializer::with_deriver(no_hwrng(), deriver);
        let source = init.initialize().unwrap();

        assert!(!source.is_seeded());
    }

    #[test]
    fn test_seeding_can_be_disabled() {
        let config = SourceConfig {
            seed_on_init: false,
            ..no_hwrng()
        };
        let source = initializer(config, MockObserver::new(1, 2)).initialize().unwrap();
        assert!(!source.is_seeded());
    }

    #[test]
    fn test_os_only() {
        let config = SourceConfig::only(&[Backend::Os]);
        let source = initializer(config, MockObserver::new(1, 2)).initialize().unwrap();
        assert_eq!(source.backend(), Backend::Os);
        assert!(!source.is_seeded());
    }

    #[test]
    fn test_all_backends_disabled() {
        let config = SourceConfig::only(&[]);
        let result = initializer(config, MockObserver::new(1, 2)).initialize();

        assert!(matches!(
            result,
            Err(SourceError::InitializationFailed { ref attempted }) if attempted.is_empty()
        ));
    }

    #[test]
    fn test_every_enabled_backend_failing() {
        let config = SourceConfig {
            backends: vec![Backend::Hardware],
            ..no_hwrng()
        };
        let result = initializer(config, MockObserver::new(1, 2)).initialize();

        assert!(matches!(
            result,
            Err(SourceError::InitializationFailed { ref attempted }) if attempted == &[Backend::Hardware]
        ));
    }
}
