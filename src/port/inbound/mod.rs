//! Inbound (driving) ports consumed by the CLI and the chat surface.

pub mod monitor;

pub use monitor::{MonitorControl, StopOutcome};
