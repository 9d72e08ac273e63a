//! Memory bounding: the periodic guard and the admission gate it drives.

mod gate;
mod guard;

pub use gate::AdmissionGate;
pub use guard::MemoryGuard;
