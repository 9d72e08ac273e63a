//! Memory sampling and reclamation ports.

use crate::error::MemoryProbeError;

/// Reads the resident memory footprint of the current process.
pub trait MemoryProbe: Send + Sync {
    /// Resident set size in bytes.
    fn resident_bytes(&self) -> Result<u64, MemoryProbeError>;
}

/// A cache or table that can release memory on request.
pub trait Reclaim: Send + Sync {
    /// Name used in cleanup logs.
    fn name(&self) -> &'static str;

    /// Best-effort release; returns how many items were dropped.
    fn reclaim(&self) -> usize;
}
