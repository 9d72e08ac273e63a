//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod health;
pub mod memory;
pub mod monitor;
pub mod service;

pub use service::MonitorService;
