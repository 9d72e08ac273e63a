//! Return freed heap pages to the OS.

use tracing::debug;

use crate::port::outbound::Reclaim;

/// Asks glibc to release free arena memory. A no-op elsewhere.
///
/// Register it after the cache reclaimers so it trims what they freed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllocatorTrim;

impl Reclaim for AllocatorTrim {
    fn name(&self) -> &'static str {
        "allocator-trim"
    }

    fn reclaim(&self) -> usize {
        let trimmed = trim();
        debug!(trimmed, "Allocator trim");
        usize::from(trimmed)
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn trim() -> bool {
    // SAFETY: malloc_trim only walks allocator state; it has no preconditions.
    unsafe { libc::malloc_trim(0) == 1 }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn trim() -> bool {
    false
}
