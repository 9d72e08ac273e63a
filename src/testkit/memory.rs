//! Settable [`MemoryProbe`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::MemoryProbeError;
use crate::port::outbound::MemoryProbe;

const MB: u64 = 1024 * 1024;

/// Reports whatever the test last set.
#[derive(Debug, Default)]
pub struct FixedMemoryProbe {
    bytes: AtomicU64,
    failing: AtomicBool,
}

impl FixedMemoryProbe {
    pub fn mb(resident_mb: u64) -> Self {
        let probe = Self::default();
        probe.set_mb(resident_mb);
        probe
    }

    pub fn set_mb(&self, resident_mb: u64) {
        self.bytes.store(resident_mb * MB, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MemoryProbe for FixedMemoryProbe {
    fn resident_bytes(&self) -> Result<u64, MemoryProbeError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MemoryProbeError::Read("probe set to fail".into()));
        }
        Ok(self.bytes.load(Ordering::SeqCst))
    }
}
