//! Process memory adapters: resident-size probe and allocator trimming.

mod procfs;
mod trim;

pub use procfs::ProcfsProbe;
pub use trim::AllocatorTrim;
