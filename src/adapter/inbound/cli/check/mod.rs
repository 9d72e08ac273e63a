//! Diagnostic command handlers.

pub mod config;
pub mod memory;
