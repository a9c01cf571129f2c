//! Direct operating-system generator backend.

use super::backend::{Backend, FillBytes, SourceError};
use rand_core::{OsRng, RngCore};

/// Thin wrapper over [`OsRng`].
///
/// Stateless; every fill is a fresh request to the kernel, so it is safe
/// to use from any thread.
#[derive(Debug, Clone, Copy)]
pub struct SystemRng {
    _private: (),
}

impl SystemRng {
    /// Probes the OS generator once and returns a handle.
    pub fn new() -> Result<Self, SourceError> {
        let mut probe = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|e| SourceError::Construction {
                backend: Backend::Os,
                reason: e.to_string(),
            })?;
        Ok(Self { _private: () })
    }
}

impl FillBytes for SystemRng {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), SourceError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| SourceError::Generation {
                backend: Backend::Os,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_requested_length() {
        let mut rng = SystemRng::new().unwrap();
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        rng.fill(&mut a).unwrap();
        rng.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
