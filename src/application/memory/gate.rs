//! Admission gate shared by the memory guard and the registry.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::CapacityError;

/// Backpressure switch. While closed, new sessions are refused; running
/// sessions are never touched.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    closed: AtomicBool,
    reason: RwLock<Option<String>>,
}

impl AdmissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Refuse new work. Returns true if the gate was open before.
    pub fn close(&self, reason: impl Into<String>) -> bool {
        *self.reason.write() = Some(reason.into());
        !self.closed.swap(true, Ordering::SeqCst)
    }

    /// Admit new work again. Returns true if the gate was closed before.
    pub fn open(&self) -> bool {
        let was_closed = self.closed.swap(false, Ordering::SeqCst);
        *self.reason.write() = None;
        was_closed
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Admission decision for one `start()`.
    pub fn check(&self) -> Result<(), CapacityError> {
        if self.is_open() {
            return Ok(());
        }
        Err(CapacityError::MemoryPressure {
            reason: self
                .reason()
                .unwrap_or_else(|| "memory limit exceeded".to_string()),
        })
    }
}
