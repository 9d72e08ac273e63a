//! Per-subscriber monitor sessions and the registry that owns them.
//!
//! The registry admits sessions under a short critical section over its
//! session table and never holds the lock across a poll, a fetch, or a
//! delivery. Each session is an independent tokio task that owns its last
//! snapshot and observes a per-session `watch` cancellation signal at both
//! of its suspension points.

mod registry;
mod session;

#[cfg(test)]
mod tests;

use std::time::Duration;

use rust_decimal::Decimal;

pub use registry::MonitorRegistry;

/// Runtime parameters shared by every session.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    /// Consecutive fetch failures that auto-stop a session.
    pub failure_threshold: u32,
    pub max_sessions: usize,
    /// Price delta a change must exceed.
    pub tolerance: Decimal,
    /// How long `stop()` waits for a session before aborting it.
    pub stop_timeout: Duration,
    /// How long `shutdown_all()` waits before aborting stragglers.
    pub shutdown_timeout: Duration,
    /// Zero reports every delisting.
    pub delist_flap_window: Duration,
    /// Stopped entries older than this are pruned by cleanup passes.
    pub stopped_retention: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            failure_threshold: 5,
            max_sessions: 50,
            tolerance: Decimal::new(5, 2),
            stop_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(10),
            delist_flap_window: Duration::ZERO,
            stopped_retention: Duration::from_secs(3600),
        }
    }
}
