//! Sportsbook live-feed client.
//!
//! Each fetch first asks the cheap version probe for the latest feed
//! version. The full snapshot (several megabytes) is downloaded and parsed
//! only when that version differs from the cached one; otherwise the cached
//! snapshot is re-stamped and returned. Many sessions polling the same feed
//! therefore cost one download per upstream version.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::dto::{LiveSnapshot, VersionProbe};
use super::parse::parse_snapshot;
use super::settings::SportsbookConfig;
use crate::domain::OddsSnapshot;
use crate::error::FetchError;
use crate::port::outbound::{OddsSource, Reclaim};

struct Cached {
    version: String,
    snapshot: OddsSnapshot,
}

pub struct SportsbookClient {
    http: HttpClient,
    config: SportsbookConfig,
    /// Most recent version reported by the probe; seeds the next probe.
    last_version: Mutex<Option<String>>,
    cache: Mutex<Option<Cached>>,
    /// Serializes snapshot downloads so concurrent sessions share one.
    refresh: tokio::sync::Mutex<()>,
}

impl SportsbookClient {
    #[must_use]
    pub fn from_config(config: SportsbookConfig) -> Self {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers(&config))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            config,
            last_version: Mutex::new(None),
            cache: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Version the cached snapshot was taken from, if any.
    pub fn cached_version(&self) -> Option<String> {
        self.cache.lock().as_ref().map(|c| c.version.clone())
    }

    async fn probe_version(&self) -> Result<String, FetchError> {
        let seed = self
            .last_version
            .lock()
            .clone()
            .unwrap_or_else(|| self.config.seed_version.clone());
        let url = self.config.probe_url(&seed);
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);

        let probe: VersionProbe = self.get_json(&url, timeout).await?;
        let version = probe
            .version()
            .ok_or_else(|| FetchError::Malformed("version probe without version".into()))?;

        debug!(%version, generated = probe.generated.unwrap_or_default(), "Probed feed version");
        *self.last_version.lock() = Some(version.clone());
        Ok(version)
    }

    fn cached_for(&self, version: &str) -> Option<OddsSnapshot> {
        self.cache
            .lock()
            .as_ref()
            .filter(|c| c.version == version)
            .map(|c| c.snapshot.recaptured(Utc::now()))
    }

    async fn download(&self, version: &str) -> Result<OddsSnapshot, FetchError> {
        let url = self.config.snapshot_url(version);
        let timeout = Duration::from_millis(self.config.snapshot_timeout_ms);

        let raw: LiveSnapshot = self.get_json(&url, timeout).await?;
        let snapshot = parse_snapshot(&raw, Utc::now())?;

        info!(%version, matches = snapshot.len(), "Downloaded feed snapshot");
        *self.cache.lock() = Some(Cached {
            version: version.to_string(),
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, timeout: Duration) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_request_error(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!("HTTP {status} from {url}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(&e, timeout))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl OddsSource for SportsbookClient {
    async fn fetch_current_odds(&self) -> Result<OddsSnapshot, FetchError> {
        let version = self.probe_version().await?;
        if let Some(snapshot) = self.cached_for(&version) {
            return Ok(snapshot);
        }

        let _refresh = self.refresh.lock().await;
        // Another caller may have downloaded this version while we waited.
        if let Some(snapshot) = self.cached_for(&version) {
            return Ok(snapshot);
        }
        self.download(&version).await
    }

    fn name(&self) -> &'static str {
        "sportsbook"
    }
}

impl Reclaim for SportsbookClient {
    fn name(&self) -> &'static str {
        "sportsbook-cache"
    }

    fn reclaim(&self) -> usize {
        usize::from(self.cache.lock().take().is_some())
    }
}

fn default_headers(config: &SportsbookConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value) in [(ORIGIN, &config.origin), (REFERER, &config.referer)] {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => warn!(header = %name, "Ignoring invalid header value"),
        }
    }
    headers
}

fn map_request_error(err: &reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else if err.is_decode() {
        FetchError::Malformed(err.to_string())
    } else {
        FetchError::Unavailable(err.to_string())
    }
}
