//! Monitor session lifecycle types.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::{SessionId, SubscriberId};

/// Lifecycle of one monitor session.
///
/// `Idle` covers the window between admission and a successful baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl SessionState {
    /// Whether the session still holds a slot in the registry.
    #[must_use]
    pub const fn occupies_slot(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Why a session reached `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The subscriber asked for it.
    UserRequested,
    /// Auto-stopped after repeated upstream failures.
    TooManyFailures { failures: u32, last_error: String },
    /// Process shutdown.
    Shutdown,
}

impl StopReason {
    /// True for stops the subscriber did not ask for.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::TooManyFailures { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserRequested => f.write_str("stopped by request"),
            Self::TooManyFailures {
                failures,
                last_error,
            } => write!(
                f,
                "stopped: too many consecutive failures ({failures}, last: {last_error})"
            ),
            Self::Shutdown => f.write_str("stopped: service shutting down"),
        }
    }
}

/// Counters a session accumulates while it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub polls: u64,
    pub consecutive_failures: u32,
    pub total_failures: u64,
    pub changes_delivered: u64,
    pub delivery_failures: u64,
    pub match_count: usize,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SessionStats {
    pub fn record_success(&mut self, match_count: usize, at: DateTime<Utc>) {
        self.polls += 1;
        self.consecutive_failures = 0;
        self.match_count = match_count;
        self.last_success_at = Some(at);
    }

    /// Returns the new consecutive failure count.
    pub fn record_failure(&mut self, error: &str) -> u32 {
        self.polls += 1;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.last_error = Some(error.to_string());
        self.consecutive_failures
    }
}

/// Point-in-time view of one session, as returned by `status()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub subscriber: SubscriberId,
    pub session_id: SessionId,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,
    #[serde(flatten)]
    pub stats: SessionStats,
    pub stop_reason: Option<StopReason>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    #[must_use]
    pub fn is_auto_stopped(&self) -> bool {
        self.stop_reason.as_ref().is_some_and(StopReason::is_degraded)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}
