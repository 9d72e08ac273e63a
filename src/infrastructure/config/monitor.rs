//! Monitor session configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::monitor::MonitorSettings;

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between polls. Overridden by `MONITOR_INTERVAL`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Consecutive fetch failures that auto-stop a session.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Global cap on sessions that are idle, running or stopping.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// A price must move by strictly more than this to count as a change.
    /// Overridden by `ODDS_CHANGE_THRESHOLD`.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Suppress repeated delistings of the same match inside this window.
    /// Zero reports every delisting.
    #[serde(default)]
    pub delist_flap_window_secs: u64,
    /// How long stopped sessions stay queryable before cleanup prunes them.
    #[serde(default = "default_stopped_retention_secs")]
    pub stopped_retention_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_max_sessions() -> usize {
    50
}

fn default_tolerance() -> Decimal {
    Decimal::new(5, 2)
}

const fn default_stop_timeout_ms() -> u64 {
    5_000
}

const fn default_shutdown_timeout_ms() -> u64 {
    10_000
}

const fn default_stopped_retention_secs() -> u64 {
    3_600
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            failure_threshold: default_failure_threshold(),
            max_sessions: default_max_sessions(),
            tolerance: default_tolerance(),
            stop_timeout_ms: default_stop_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            delist_flap_window_secs: 0,
            stopped_retention_secs: default_stopped_retention_secs(),
        }
    }
}

impl MonitorConfig {
    /// Runtime settings for the registry.
    #[must_use]
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            failure_threshold: self.failure_threshold,
            max_sessions: self.max_sessions,
            tolerance: self.tolerance,
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
            delist_flap_window: Duration::from_secs(self.delist_flap_window_secs),
            stopped_retention: Duration::from_secs(self.stopped_retention_secs),
        }
    }
}
