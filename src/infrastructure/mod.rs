//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading, environment overrides and validation
//! - [`orchestration`] - Service lifecycle

pub mod bootstrap;
pub mod config;
pub mod orchestration;
