//! Kernel hardware RNG backend.
//!
//! Reads from the character device the kernel exposes for the platform's
//! hardware generator (TPM, chipset RNG, virtio-rng, ...). Absence of the
//! device is the common case on desktops and containers.

use super::backend::{Backend, FillBytes, SourceError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Conventional location of the kernel hardware RNG device.
pub const DEFAULT_HWRNG_PATH: &str = "/dev/hwrng";

/// Bytes read during construction to prove the device produces output.
const PROBE_LEN: usize = 4;

/// Longest a device may take to open and answer the probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Hardware generator read through a device file.
///
/// Holds an open file handle and requires `&mut self` to fill, so it is
/// intended for a single caller.
#[derive(Debug)]
pub struct HardwareRng {
    device: File,
    path: PathBuf,
}

impl HardwareRng {
    /// Opens the device at `path` and probes it once, allowing
    /// [`PROBE_TIMEOUT`] for an answer.
    ///
    /// A device that opens but cannot deliver bytes fails construction
    /// instead of failing later fills.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::open_with_timeout(path, PROBE_TIMEOUT)
    }

    /// Opens and probes the device, failing construction if it stalls.
    ///
    /// Open and probe run on a helper thread. A device that stalls past
    /// `timeout` leaves that thread parked in the kernel; the source is
    /// rejected either way.
    pub fn open_with_timeout(path: impl AsRef<Path>, timeout: Duration) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = mpsc::channel();

        let probe_path = path.clone();
        thread::Builder::new()
            .name("hwrng-probe".into())
            .spawn(move || {
                let _ = tx.send(Self::open_and_probe(probe_path));
            })
            .map_err(|e| SourceError::Construction {
                backend: Backend::Hardware,
                reason: format!("probe thread: {}", e),
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(SourceError::Construction {
                backend: Backend::Hardware,
                reason: format!("{}: no output within {:?}", path.display(), timeout),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SourceError::Construction {
                backend: Backend::Hardware,
                reason: format!("{}: probe aborted", path.display()),
            }),
        }
    }

    fn open_and_probe(path: PathBuf) -> Result<Self, SourceError> {
        let device = File::open(&path).map_err(|e| SourceError::Construction {
            backend: Backend::Hardware,
            reason: format!("{}: {}", path.display(), e),
        })?;

        let mut rng = Self { device, path };
        let mut probe = [0u8; PROBE_LEN];
        rng.fill(&mut probe).map_err(|e| SourceError::Construction {
            backend: Backend::Hardware,
            reason: format!("probe read failed: {}", e),
        })?;

        tracing::debug!(path = %rng.path.display(), "Hardware RNG opened");
        Ok(rng)
    }

    /// Returns the device path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FillBytes for HardwareRng {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        self.device
            .read_exact(dest)
            .map_err(|e| SourceError::Generation {
                backend: Backend::Hardware,
                reason: format!("{}: {}", self.path.display(), e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_device_fails_construction() {
        let result = HardwareRng::open("/nonexistent/dev-random-test/hwrng");
        assert!(matches!(
            result,
            Err(SourceError::Construction {
                backend: Backend::Hardware,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_device_fails_probe() {
        let path = std::env::temp_dir().join(format!("dev-random-hwrng-empty-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let result = HardwareRng::open(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(SourceError::Construction { .. })));
    }

    #[test]
    fn test_reads_exact_bytes_from_device_file() {
        let path = std::env::temp_dir().join(format!("dev-random-hwrng-data-{}", std::process::id()));
        let content: Vec<u8> = (0u8..32).collect();
        std::fs::write(&path, &content).unwrap();

        let mut rng = HardwareRng::open(&path).unwrap();
        let mut buf = [0u8; 8];
        rng.fill(&mut buf).unwrap();

        // The probe consumed the first four bytes.
        assert_eq!(buf, [4, 5, 6, 7, 8, 9, 10, 11]);

        let mut too_much = [0u8; 64];
        assert!(matches!(
            rng.fill(&mut too_much),
            Err(SourceError::Generation { .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stalled_device_fails_construction() {
        let path = std::env::temp_dir().join(format!("dev-random-hwrng-fifo-{}", std::process::id()));
        let created = std::process::Command::new("mkfifo").arg(&path).status();
        if !matches!(created, Ok(status) if status.success()) {
            return;
        }

        // A FIFO with no writer never answers the open or the probe.
        let result = HardwareRng::open_with_timeout(&path, Duration::from_millis(100));
        assert!(matches!(
            result,
            Err(SourceError::Construction {
                backend: Backend::Hardware,
                ..
            })
        ));

        // Release the parked probe thread.
        drop(std::fs::OpenOptions::new().write(true).open(&path));
        std::fs::remove_file(&path).unwrap();
    }
}
