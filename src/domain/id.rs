//! Domain identifier types with proper encapsulation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscriber identity - the chat that receives notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(i64);

impl SubscriberId {
    /// Create a new `SubscriberId` from a raw chat identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for one monitor session run.
///
/// Generated as UUID v4, so restarting a monitor for the same subscriber
/// yields a distinguishable session in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new `SessionId` with a generated UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a match across snapshots.
///
/// The feed's event id is preferred; when the source supplies none the
/// fixture itself (teams plus kickoff) serves as a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchKey {
    /// Upstream event identifier.
    Event { id: String },
    /// Composite key for sources without numeric ids.
    Fixture {
        home: String,
        away: String,
        kickoff: DateTime<Utc>,
    },
}

impl MatchKey {
    /// Key from an upstream event id.
    pub fn event(id: impl Into<String>) -> Self {
        Self::Event { id: id.into() }
    }

    /// Composite key from the fixture.
    pub fn fixture(home: impl Into<String>, away: impl Into<String>, kickoff: DateTime<Utc>) -> Self {
        Self::Fixture {
            home: home.into(),
            away: away.into(),
            kickoff,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event { id } => write!(f, "#{id}"),
            Self::Fixture {
                home,
                away,
                kickoff,
            } => write!(f, "{home} vs {away} @ {}", kickoff.format("%Y-%m-%d %H:%M")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn fixture_keys_compare_by_all_parts() {
        let kickoff = Utc.with_ymd_and_hms(2025, 5, 1, 19, 0, 0).unwrap();
        let a = MatchKey::fixture("A", "B", kickoff);
        let b = MatchKey::fixture("A", "B", kickoff);
        let c = MatchKey::fixture("A", "B", kickoff + chrono::Duration::hours(1));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "A vs B @ 2025-05-01 19:00");
    }

    #[test]
    fn event_key_display() {
        assert_eq!(MatchKey::event("991").to_string(), "#991");
    }
}
