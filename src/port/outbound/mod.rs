//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod memory;
pub mod notifier;
pub mod source;

pub use memory::{MemoryProbe, Reclaim};
pub use notifier::{LogNotifier, Notification, Notifier, NullNotifier};
pub use source::OddsSource;
