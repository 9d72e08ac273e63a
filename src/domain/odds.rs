//! Point-in-time odds captures.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MatchKey;

/// Decimal 1X2 prices for one match: home win, draw, away win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prices {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
}

impl Prices {
    #[must_use]
    pub const fn new(home: Decimal, draw: Decimal, away: Decimal) -> Self {
        Self { home, draw, away }
    }

    /// Validating constructor; decimal odds are always above zero.
    pub fn try_new(home: Decimal, draw: Decimal, away: Decimal) -> Result<Self, DomainError> {
        for (outcome, price) in [("home", home), ("draw", draw), ("away", away)] {
            if price <= Decimal::ZERO {
                return Err(DomainError::NonPositivePrice { outcome, price });
            }
        }
        Ok(Self::new(home, draw, away))
    }

    /// Absolute per-outcome deltas against `other`, in home/draw/away order.
    #[must_use]
    pub fn deltas(&self, other: &Self) -> [Decimal; 3] {
        [
            (self.home - other.home).abs(),
            (self.draw - other.draw).abs(),
            (self.away - other.away).abs(),
        ]
    }
}

impl fmt::Display for Prices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.home, self.draw, self.away)
    }
}

/// Odds for one match in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub key: MatchKey,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub kickoff: Option<DateTime<Utc>>,
    pub prices: Prices,
}

impl MatchOdds {
    pub fn new(
        key: MatchKey,
        league: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        kickoff: Option<DateTime<Utc>>,
        prices: Prices,
    ) -> Self {
        Self {
            key,
            league: league.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            kickoff,
            prices,
        }
    }

    /// "Home vs Away" label used in rendered output.
    #[must_use]
    pub fn fixture(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// A full point-in-time capture of all currently offered match odds.
///
/// Match order is the order the source reported them in and is preserved,
/// since diff output is ordered by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct OddsSnapshot {
    matches: Vec<MatchOdds>,
    captured_at: DateTime<Utc>,
}

/// Unchecked wire form; deserialization goes through [`OddsSnapshot::try_new`].
#[derive(Deserialize)]
struct RawSnapshot {
    matches: Vec<MatchOdds>,
    captured_at: DateTime<Utc>,
}

impl TryFrom<RawSnapshot> for OddsSnapshot {
    type Error = DomainError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        Self::try_new(raw.matches, raw.captured_at)
    }
}

impl OddsSnapshot {
    /// Build a snapshot, rejecting duplicate match keys.
    pub fn try_new(matches: Vec<MatchOdds>, captured_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(matches.len());
        for m in &matches {
            if !seen.insert(&m.key) {
                return Err(DomainError::DuplicateMatchKey {
                    key: m.key.to_string(),
                });
            }
        }
        Ok(Self {
            matches,
            captured_at,
        })
    }

    #[must_use]
    pub fn matches(&self) -> &[MatchOdds] {
        &self.matches
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Same contents, new capture time. Used when the feed reports no new version.
    #[must_use]
    pub fn recaptured(&self, at: DateTime<Utc>) -> Self {
        Self {
            matches: self.matches.clone(),
            captured_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn odds(id: &str) -> MatchOdds {
        MatchOdds::new(
            MatchKey::event(id),
            "League",
            "Home",
            "Away",
            None,
            Prices::new(dec!(2.0), dec!(3.0), dec!(4.0)),
        )
    }

    #[test]
    fn prices_reject_non_positive_values() {
        let err = Prices::try_new(dec!(1.5), dec!(0), dec!(2.0)).unwrap_err();
        assert_eq!(
            err,
            DomainError::NonPositivePrice {
                outcome: "draw",
                price: dec!(0)
            }
        );
        assert!(Prices::try_new(dec!(1.5), dec!(3.1), dec!(2.0)).is_ok());
    }

    #[test]
    fn deltas_are_absolute() {
        let a = Prices::new(dec!(1.50), dec!(3.20), dec!(4.10));
        let b = Prices::new(dec!(1.55), dec!(3.10), dec!(4.10));
        assert_eq!(a.deltas(&b), [dec!(0.05), dec!(0.10), dec!(0.00)]);
    }

    #[test]
    fn snapshot_preserves_source_order() {
        let snap = OddsSnapshot::try_new(vec![odds("3"), odds("1"), odds("2")], Utc::now()).unwrap();
        let ids: Vec<_> = snap.matches().iter().map(|m| m.key.to_string()).collect();
        assert_eq!(ids, ["#3", "#1", "#2"]);
    }

    #[test]
    fn snapshot_rejects_duplicate_keys() {
        let err = OddsSnapshot::try_new(vec![odds("1"), odds("1")], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateMatchKey { key } if key == "#1"));
    }

    #[test]
    fn deserializing_checks_unique_keys() {
        let snap = OddsSnapshot::try_new(vec![odds("1")], Utc::now()).unwrap();
        let mut value = serde_json::to_value(&snap).unwrap();
        let back: OddsSnapshot = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, snap);

        let first = value["matches"][0].clone();
        value["matches"].as_array_mut().unwrap().push(first);
        let err = serde_json::from_value::<OddsSnapshot>(value).unwrap_err();
        assert!(err.to_string().contains("duplicate match key"));
    }

    #[test]
    fn recaptured_keeps_matches() {
        let snap = OddsSnapshot::try_new(vec![odds("1")], Utc::now()).unwrap();
        let later = snap.captured_at() + chrono::Duration::seconds(30);
        let again = snap.recaptured(later);
        assert_eq!(again.matches(), snap.matches());
        assert_eq!(again.captured_at(), later);
    }
}
