//! Sportsbook feed configuration.

use serde::Deserialize;

/// Connection settings for the sportsbook live feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SportsbookConfig {
    /// Feed host, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Brand identifier embedded in every path.
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Version used for the first probe, before any version is known.
    #[serde(default = "default_seed_version")]
    pub seed_version: String,
    /// Version probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Snapshot download timeout in milliseconds.
    #[serde(default = "default_snapshot_timeout_ms")]
    pub snapshot_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_referer")]
    pub referer: String,
}

fn default_base_url() -> String {
    "https://api-k-c7818b61-623.sptpub.com".into()
}

fn default_brand() -> String {
    "2103509236163162112".into()
}

fn default_language() -> String {
    "en".into()
}

fn default_seed_version() -> String {
    "3517210528874".into()
}

const fn default_probe_timeout_ms() -> u64 {
    10_000
}

const fn default_snapshot_timeout_ms() -> u64 {
    15_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_origin() -> String {
    "https://bc.game".into()
}

fn default_referer() -> String {
    "https://bc.game/".into()
}

impl Default for SportsbookConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            brand: default_brand(),
            language: default_language(),
            seed_version: default_seed_version(),
            probe_timeout_ms: default_probe_timeout_ms(),
            snapshot_timeout_ms: default_snapshot_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
            origin: default_origin(),
            referer: default_referer(),
        }
    }
}

impl SportsbookConfig {
    /// Lightweight endpoint reporting the latest feed version.
    #[must_use]
    pub fn probe_url(&self, seed: &str) -> String {
        format!(
            "{}/api/v1/side/brand/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.brand,
            seed
        )
    }

    /// Full live snapshot for one feed version.
    #[must_use]
    pub fn snapshot_url(&self, version: &str) -> String {
        format!(
            "{}/api/v3/live/brand/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.brand,
            self.language,
            version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_feed_layout() {
        let config = SportsbookConfig {
            base_url: "https://feed.example/".into(),
            brand: "42".into(),
            language: "en".into(),
            ..SportsbookConfig::default()
        };

        assert_eq!(
            config.probe_url("100"),
            "https://feed.example/api/v1/side/brand/42/100"
        );
        assert_eq!(
            config.snapshot_url("101"),
            "https://feed.example/api/v3/live/brand/42/en/101"
        );
    }
}
