//! Snapshot differ.
//!
//! Compares two snapshots and reports, in deterministic order:
//!
//! 1. Matches in `current`, in `current` order: new listings, and matches
//!    whose prices moved by more than the tolerance.
//! 2. Matches only in `previous`, in `previous` order, as delistings.
//!
//! A missing `previous` (first poll) establishes a baseline and reports
//! nothing.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use super::change::OddsChange;
use super::id::MatchKey;
use super::odds::{MatchOdds, OddsSnapshot};

/// Pure snapshot comparison with a fixed price tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotDiffer {
    tolerance: Decimal,
}

impl SnapshotDiffer {
    /// Negative tolerances are clamped to zero.
    #[must_use]
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.max(Decimal::ZERO),
        }
    }

    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Diff `current` against `previous`.
    #[must_use]
    pub fn diff(&self, previous: Option<&OddsSnapshot>, current: &OddsSnapshot) -> Vec<OddsChange> {
        let Some(previous) = previous else {
            return Vec::new();
        };

        let before: HashMap<&MatchKey, &MatchOdds> = previous
            .matches()
            .iter()
            .map(|m| (&m.key, m))
            .collect();

        let mut changes = Vec::new();
        let mut present: HashSet<&MatchKey> = HashSet::with_capacity(current.len());

        for now in current.matches() {
            present.insert(&now.key);
            match before.get(&now.key) {
                None => changes.push(OddsChange::listed(now)),
                Some(then) => {
                    let magnitude = now
                        .prices
                        .deltas(&then.prices)
                        .into_iter()
                        .max()
                        .unwrap_or(Decimal::ZERO);
                    if magnitude > self.tolerance {
                        changes.push(OddsChange::moved(then, now, magnitude));
                    }
                }
            }
        }

        changes.extend(
            previous
                .matches()
                .iter()
                .filter(|m| !present.contains(&m.key))
                .map(OddsChange::delisted),
        );

        changes
    }
}

impl Default for SnapshotDiffer {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}
