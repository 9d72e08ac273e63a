//! Builders for domain primitives.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{MatchKey, MatchOdds, OddsSnapshot, Prices};

/// Event-keyed match with teams derived from the id.
pub fn match_odds(id: &str, home: Decimal, draw: Decimal, away: Decimal) -> MatchOdds {
    MatchOdds::new(
        MatchKey::event(id),
        "Test League",
        format!("{id} Home"),
        format!("{id} Away"),
        None,
        Prices::new(home, draw, away),
    )
}

/// Fixture-keyed match, for sources without event ids.
pub fn fixture_odds(
    home: &str,
    away: &str,
    kickoff: DateTime<Utc>,
    prices: (Decimal, Decimal, Decimal),
) -> MatchOdds {
    MatchOdds::new(
        MatchKey::fixture(home, away, kickoff),
        "Test League",
        home,
        away,
        Some(kickoff),
        Prices::new(prices.0, prices.1, prices.2),
    )
}

/// Snapshot captured now. Panics on duplicate keys.
pub fn snapshot(matches: Vec<MatchOdds>) -> OddsSnapshot {
    OddsSnapshot::try_new(matches, Utc::now()).expect("test snapshot keys must be unique")
}

/// Single-match snapshot.
pub fn one_match(id: &str, home: Decimal, draw: Decimal, away: Decimal) -> OddsSnapshot {
    snapshot(vec![match_odds(id, home, draw, away)])
}
