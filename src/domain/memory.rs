//! Process memory state observed by the memory guard.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Coarse classification of resident memory against the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryLevel {
    Normal,
    High,
    Critical,
    /// The last sample failed.
    Unknown,
}

impl fmt::Display for MemoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Soft and hard resident-memory limits in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryLimits {
    soft_bytes: u64,
    hard_bytes: u64,
}

impl MemoryLimits {
    pub fn try_new(soft_bytes: u64, hard_bytes: u64) -> Result<Self, DomainError> {
        if soft_bytes >= hard_bytes {
            return Err(DomainError::InvertedMemoryLimits {
                soft: soft_bytes,
                hard: hard_bytes,
            });
        }
        Ok(Self {
            soft_bytes,
            hard_bytes,
        })
    }

    pub fn from_mb(soft_mb: u64, hard_mb: u64) -> Result<Self, DomainError> {
        let bytes = |mb: u64| {
            mb.checked_mul(BYTES_PER_MB)
                .ok_or(DomainError::MemoryLimitOutOfRange { mb })
        };
        Self::try_new(bytes(soft_mb)?, bytes(hard_mb)?)
    }

    #[must_use]
    pub const fn soft_bytes(&self) -> u64 {
        self.soft_bytes
    }

    #[must_use]
    pub const fn hard_bytes(&self) -> u64 {
        self.hard_bytes
    }

    #[must_use]
    pub fn classify(&self, resident_bytes: Option<u64>) -> MemoryLevel {
        match resident_bytes {
            None => MemoryLevel::Unknown,
            Some(b) if b >= self.hard_bytes => MemoryLevel::Critical,
            Some(b) if b >= self.soft_bytes => MemoryLevel::High,
            Some(_) => MemoryLevel::Normal,
        }
    }
}

/// Process-wide memory state. Mutated only by the memory guard.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryState {
    /// Resident set size from the last sample, `None` if sampling failed.
    pub resident_bytes: Option<u64>,
    pub limits: MemoryLimits,
    pub sampled_at: Option<DateTime<Utc>>,
    pub last_cleanup_at: Option<DateTime<Utc>>,
    /// True while new sessions are being refused.
    pub shedding: bool,
}

impl MemoryState {
    #[must_use]
    pub fn new(limits: MemoryLimits) -> Self {
        Self {
            resident_bytes: None,
            limits,
            sampled_at: None,
            last_cleanup_at: None,
            shedding: false,
        }
    }

    #[must_use]
    pub fn level(&self) -> MemoryLevel {
        self.limits.classify(self.resident_bytes)
    }

    #[must_use]
    pub fn resident_mb(&self) -> Option<f64> {
        self.resident_bytes.map(|b| b as f64 / BYTES_PER_MB as f64)
    }

    /// Resident usage as a fraction of the hard limit.
    #[must_use]
    pub fn usage_ratio(&self) -> Option<f64> {
        self.resident_bytes
            .map(|b| b as f64 / self.limits.hard_bytes() as f64)
    }
}
