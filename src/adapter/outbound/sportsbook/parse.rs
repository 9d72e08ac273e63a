//! Live snapshot to domain snapshot.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use super::dto::{id_string, EventNode, LiveSnapshot};
use crate::domain::{MatchKey, MatchOdds, OddsSnapshot, Prices};
use crate::error::FetchError;

/// Market id of the full-time 1X2 market.
const MARKET_1X2: &str = "1";

const UNKNOWN_LEAGUE: &str = "Unknown League";

/// Extract every complete 1X2 market, ordered by event id.
pub fn parse_snapshot(raw: &LiveSnapshot, captured_at: DateTime<Utc>) -> Result<OddsSnapshot, FetchError> {
    let mut ids: Vec<&String> = raw.events.keys().collect();
    ids.sort_by(|a, b| {
        (a.parse::<u64>().ok(), a.as_str()).cmp(&(b.parse::<u64>().ok(), b.as_str()))
    });

    let mut matches = Vec::with_capacity(ids.len());
    let mut skipped = 0usize;

    for id in ids {
        let Some(node) = raw
            .events
            .get(id)
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<EventNode>(v.clone()).ok())
        else {
            skipped += 1;
            continue;
        };

        let Some(prices) = parse_1x2(&node) else {
            skipped += 1;
            continue;
        };

        let desc = &node.desc;
        let home = desc
            .home_name
            .clone()
            .or_else(|| desc.home.clone())
            .unwrap_or_else(|| "Home".into());
        let away = desc
            .away_name
            .clone()
            .or_else(|| desc.away.clone())
            .unwrap_or_else(|| "Away".into());
        let kickoff = desc.scheduled.as_ref().and_then(epoch_seconds);

        matches.push(MatchOdds::new(
            MatchKey::event(id.as_str()),
            league_name(raw, &node),
            home,
            away,
            kickoff,
            prices,
        ));
    }

    debug!(matches = matches.len(), skipped, "Parsed live snapshot");

    if matches.is_empty() {
        return Err(FetchError::Empty);
    }
    OddsSnapshot::try_new(matches, captured_at).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// First line of market "1", as `1/X/2` or `1/2/3` (2 = draw, 3 = away).
fn parse_1x2(node: &EventNode) -> Option<Prices> {
    let lines = node.markets.get(MARKET_1X2)?.as_object()?;
    let outcomes = lines.values().find_map(Value::as_object)?;
    let price = |name: &str| outcomes.get(name).and_then(|o| o.get("k")).and_then(decimal);

    let (home, draw, away) = if outcomes.contains_key("X") {
        (price("1")?, price("X")?, price("2").or_else(|| price("3"))?)
    } else {
        (price("1")?, price("2")?, price("3")?)
    };
    Prices::try_new(home, draw, away).ok()
}

/// Tournament name, prefixed with its country unless already present.
fn league_name(raw: &LiveSnapshot, node: &EventNode) -> String {
    let Some(tournament) = node
        .desc
        .tournament_id
        .as_ref()
        .and_then(id_string)
        .and_then(|tid| raw.tournaments.get(&tid))
    else {
        return UNKNOWN_LEAGUE.into();
    };

    let league = tournament
        .name
        .clone()
        .unwrap_or_else(|| UNKNOWN_LEAGUE.into());
    let country = tournament
        .category_id
        .as_ref()
        .and_then(id_string)
        .and_then(|cid| raw.categories.get(&cid))
        .and_then(|c| c.name.as_deref());

    match country {
        Some(country) if !league.contains(country) => format!("{country} — {league}"),
        _ => league,
    }
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn epoch_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}
