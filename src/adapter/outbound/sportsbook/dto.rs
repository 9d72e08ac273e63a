//! Wire types for the sportsbook feed.
//!
//! The feed is loosely typed: ids arrive as numbers or strings and event
//! nodes are not guaranteed to be objects, so the raw parts stay as
//! `serde_json::Value` until the parser picks them apart.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Version probe response.
#[derive(Debug, Deserialize)]
pub struct VersionProbe {
    pub version: Option<Value>,
    #[serde(default)]
    pub generated: Option<i64>,
}

impl VersionProbe {
    pub fn version(&self) -> Option<String> {
        self.version.as_ref().and_then(id_string)
    }
}

/// Full live snapshot.
#[derive(Debug, Default, Deserialize)]
pub struct LiveSnapshot {
    #[serde(default)]
    pub events: HashMap<String, Value>,
    #[serde(default)]
    pub tournaments: HashMap<String, Tournament>,
    #[serde(default)]
    pub categories: HashMap<String, Category>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventNode {
    #[serde(default)]
    pub desc: EventDesc,
    #[serde(default)]
    pub markets: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventDesc {
    pub home_name: Option<String>,
    pub home: Option<String>,
    pub away_name: Option<String>,
    pub away: Option<String>,
    pub tournament_id: Option<Value>,
    /// Kickoff, epoch seconds.
    pub scheduled: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Tournament {
    pub name: Option<String>,
    pub category_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Category {
    pub name: Option<String>,
}

/// Normalise a numeric or string id.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
