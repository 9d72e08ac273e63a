//! Delisting flap suppression.
//!
//! Feeds sometimes drop a market and re-add it a few polls later. With a
//! non-zero window, a second "delisted" report for the same key inside the
//! window is swallowed. Relistings always pass through.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::change::{ChangeKind, OddsChange};
use super::id::MatchKey;

/// Per-session memory of recently reported delistings.
#[derive(Debug, Clone)]
pub struct DelistFilter {
    window: Duration,
    reported: HashMap<MatchKey, DateTime<Utc>>,
}

impl DelistFilter {
    /// A zero window disables suppression.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            reported: HashMap::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.window > Duration::zero()
    }

    /// Number of delistings currently remembered.
    #[must_use]
    pub fn remembered(&self) -> usize {
        self.reported.len()
    }

    /// Drop repeated delistings seen within the window.
    pub fn apply(&mut self, changes: Vec<OddsChange>, now: DateTime<Utc>) -> Vec<OddsChange> {
        if !self.is_enabled() {
            return changes;
        }

        let window = self.window;
        self.reported.retain(|_, at| now - *at < window);

        changes
            .into_iter()
            .filter(|change| {
                if change.kind != ChangeKind::Delisted {
                    return true;
                }
                if self.reported.contains_key(&change.key) {
                    return false;
                }
                self.reported.insert(change.key.clone(), now);
                true
            })
            .collect()
    }
}
