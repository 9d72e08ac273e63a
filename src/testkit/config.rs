//! Canonical test configurations.
//!
//! Single source of truth for settings used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::application::monitor::MonitorSettings;
use crate::domain::MemoryLimits;

/// Fast monitor settings: polls every 20ms, three strikes, four slots,
/// zero tolerance so any price move counts.
pub fn monitor_settings() -> MonitorSettings {
    MonitorSettings {
        poll_interval: Duration::from_millis(20),
        failure_threshold: 3,
        max_sessions: 4,
        tolerance: Decimal::ZERO,
        stop_timeout: Duration::from_secs(1),
        shutdown_timeout: Duration::from_secs(1),
        delist_flap_window: Duration::ZERO,
        stopped_retention: Duration::from_secs(3_600),
    }
}

/// Soft 100 MB, hard 200 MB.
pub fn memory_limits() -> MemoryLimits {
    MemoryLimits::from_mb(100, 200).expect("100 < 200")
}

/// Memory check cadence for guards spawned in tests.
pub fn memory_check_interval() -> Duration {
    Duration::from_millis(20)
}
