//! Application orchestration.
//!
//! Runtime wiring and lifecycle management for the long-running service.

mod runtime;

pub use runtime::run_with_shutdown;
