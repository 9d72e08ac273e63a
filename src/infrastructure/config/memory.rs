//! Memory guard configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::MemoryLimits;

/// `[memory]` section.
///
/// Explicit soft and hard limits win; otherwise they derive from
/// `max_mb` (70% and 90%).
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Memory budget for the process. Overridden by `MAX_MEMORY_MB`.
    #[serde(default = "default_max_mb")]
    pub max_mb: u64,
    #[serde(default)]
    pub soft_limit_mb: Option<u64>,
    #[serde(default)]
    pub hard_limit_mb: Option<u64>,
    /// Overridden by `MEMORY_CHECK_INTERVAL`.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_max_mb() -> u64 {
    450
}

const fn default_check_interval_secs() -> u64 {
    300
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_mb: default_max_mb(),
            soft_limit_mb: None,
            hard_limit_mb: None,
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl MemoryConfig {
    #[must_use]
    pub fn soft_mb(&self) -> u64 {
        self.soft_limit_mb.unwrap_or_else(|| percent_of(self.max_mb, 70))
    }

    #[must_use]
    pub fn hard_mb(&self) -> u64 {
        self.hard_limit_mb.unwrap_or_else(|| percent_of(self.max_mb, 90))
    }

    pub fn limits(&self) -> Result<MemoryLimits, DomainError> {
        MemoryLimits::from_mb(self.soft_mb(), self.hard_mb())
    }

    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

/// `value * percent / 100`, rounded down, without overflowing.
const fn percent_of(value: u64, percent: u64) -> u64 {
    value / 100 * percent + value % 100 * percent / 100
}
