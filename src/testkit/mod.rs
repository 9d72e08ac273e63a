//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] - `ScriptedSource`, an [`OddsSource`](crate::port::outbound::OddsSource)
//!   replaying queued results with an optional per-fetch delay.
//! - [`notifier`] - `RecordingNotifier`, collects deliveries and can fail on demand.
//! - [`memory`] - `FixedMemoryProbe` with a settable reading.
//! - [`domain`] - Builders for matches and snapshots.
//! - [`config`] - Canonical fast settings and memory limits.
//! - [`service`] - A `MonitorService` wired over the doubles above.

pub mod config;
pub mod domain;
pub mod memory;
pub mod notifier;
pub mod service;
pub mod source;
