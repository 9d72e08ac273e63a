use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failure to obtain a usable odds snapshot from the upstream feed.
///
/// Every variant is retryable: sessions count them towards their
/// consecutive-failure threshold instead of propagating them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("upstream returned no football 1X2 markets")]
    Empty,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Short machine-friendly label used in logs and status output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Malformed(_) => "malformed",
            Self::Empty => "empty",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Failure to hand a payload to a subscriber. Never fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("subscriber {subscriber} unreachable: {reason}")]
    Unreachable { subscriber: i64, reason: String },

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Why the registry refused to admit a new session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("session limit reached ({active}/{limit})")]
    GlobalLimit { active: usize, limit: usize },

    #[error("memory pressure, new monitors are paused ({reason})")]
    MemoryPressure { reason: String },
}

/// Rejection or failure returned synchronously by `MonitorRegistry::start`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("a monitor is already running for this subscriber")]
    AlreadyRunning,

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("baseline snapshot failed: {0}")]
    Baseline(#[source] FetchError),

    #[error("monitor was stopped before its baseline completed")]
    Cancelled,

    #[error("the service is shutting down")]
    ShuttingDown,
}

/// Failure to read the process memory footprint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryProbeError {
    #[error("memory sampling is not supported on this platform")]
    Unsupported,

    #[error("failed to read memory statistics: {0}")]
    Read(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Memory(#[from] MemoryProbeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
