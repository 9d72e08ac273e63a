//! Infrastructure configuration modules.

pub mod logging;
pub mod memory;
pub mod monitor;
pub mod settings;
pub mod telegram;

pub use settings::Config;
