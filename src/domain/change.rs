//! Detected differences between consecutive snapshots.

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::MatchKey;
use super::odds::{MatchOdds, Prices};

/// What happened to a match between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// At least one price moved beyond the tolerance.
    Moved,
    /// The match appeared; there are no previous prices.
    Listed,
    /// The match disappeared from the feed.
    Delisted,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moved => "moved",
            Self::Listed => "listed",
            Self::Delisted => "delisted",
        }
    }
}

/// One change record. Lives for a single notification cycle only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OddsChange {
    pub key: MatchKey,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub kind: ChangeKind,
    /// `None` for new listings ("unavailable").
    pub previous: Option<Prices>,
    /// `None` for delistings.
    pub current: Option<Prices>,
    /// Largest absolute price delta; zero for listings and delistings.
    pub magnitude: Decimal,
}

impl OddsChange {
    pub(crate) fn moved(previous: &MatchOdds, current: &MatchOdds, magnitude: Decimal) -> Self {
        Self {
            key: current.key.clone(),
            league: current.league.clone(),
            home_team: current.home_team.clone(),
            away_team: current.away_team.clone(),
            kind: ChangeKind::Moved,
            previous: Some(previous.prices),
            current: Some(current.prices),
            magnitude,
        }
    }

    pub(crate) fn listed(current: &MatchOdds) -> Self {
        Self {
            key: current.key.clone(),
            league: current.league.clone(),
            home_team: current.home_team.clone(),
            away_team: current.away_team.clone(),
            kind: ChangeKind::Listed,
            previous: None,
            current: Some(current.prices),
            magnitude: Decimal::ZERO,
        }
    }

    pub(crate) fn delisted(previous: &MatchOdds) -> Self {
        Self {
            key: previous.key.clone(),
            league: previous.league.clone(),
            home_team: previous.home_team.clone(),
            away_team: previous.away_team.clone(),
            kind: ChangeKind::Delisted,
            previous: Some(previous.prices),
            current: None,
            magnitude: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn fixture(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}
