//! Handler for the `odds` command: one fetch, printed as a table.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::OddsArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::sportsbook::SportsbookClient;
use crate::domain::{MatchOdds, OddsSnapshot};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::OddsSource;

#[derive(Tabled)]
struct OddsRow {
    #[tabled(rename = "Match")]
    key: String,
    #[tabled(rename = "League")]
    league: String,
    #[tabled(rename = "Fixture")]
    fixture: String,
    #[tabled(rename = "Kickoff")]
    kickoff: String,
    #[tabled(rename = "1")]
    home: String,
    #[tabled(rename = "X")]
    draw: String,
    #[tabled(rename = "2")]
    away: String,
}

impl From<&MatchOdds> for OddsRow {
    fn from(m: &MatchOdds) -> Self {
        Self {
            key: m.key.to_string(),
            league: m.league.clone(),
            fixture: m.fixture(),
            kickoff: m
                .kickoff
                .map_or_else(|| "-".into(), |k| k.format("%Y-%m-%d %H:%M").to_string()),
            home: m.prices.home.to_string(),
            draw: m.prices.draw.to_string(),
            away: m.prices.away.to_string(),
        }
    }
}

pub async fn execute(args: &OddsArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let client = SportsbookClient::from_config(config.source);

    let pb = output::spinner("Fetching live odds");
    let snapshot = match client.fetch_current_odds().await {
        Ok(snapshot) => {
            output::spinner_success(&pb, &format!("{} matches", snapshot.len()));
            snapshot
        }
        Err(e) => {
            output::spinner_fail(&pb, "Fetch failed");
            return Err(e.into());
        }
    };

    let limit = args.limit.unwrap_or(usize::MAX);
    if output::is_json() {
        output::json_output(snapshot_json(&snapshot, limit));
        return Ok(());
    }

    let rows: Vec<OddsRow> = snapshot.matches().iter().take(limit).map(OddsRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    if snapshot.len() > limit {
        output::hint(&format!("{} more matches, raise --limit to see them", snapshot.len() - limit));
    }
    Ok(())
}

fn snapshot_json(snapshot: &OddsSnapshot, limit: usize) -> serde_json::Value {
    json!({
        "command": "odds",
        "captured_at": snapshot.captured_at(),
        "total": snapshot.len(),
        "matches": snapshot.matches().iter().take(limit).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{match_odds, snapshot};
    use rust_decimal_macros::dec;

    #[test]
    fn row_formats_prices_and_missing_kickoff() {
        let m = match_odds("1", dec!(1.5), dec!(3.2), dec!(6.0));
        let row = OddsRow::from(&m);
        assert_eq!(row.key, m.key.to_string());
        assert_eq!((row.home.as_str(), row.draw.as_str(), row.away.as_str()), ("1.5", "3.2", "6.0"));
        assert_eq!(row.kickoff, "-");
    }

    #[test]
    fn json_respects_limit_but_reports_total() {
        let snap = snapshot(vec![
            match_odds("1", dec!(1.5), dec!(3.2), dec!(6.0)),
            match_odds("2", dec!(2.0), dec!(3.0), dec!(4.0)),
            match_odds("3", dec!(2.5), dec!(3.0), dec!(2.8)),
        ]);
        let value = snapshot_json(&snap, 2);
        assert_eq!(value["total"], 3);
        assert_eq!(value["matches"].as_array().unwrap().len(), 2);
    }
}
