//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for the bot token, the user lists and the deployment knobs.
//!
//! # Example
//!
//! ```no_run
//! use oddswatch::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::memory::MemoryConfig;
use super::monitor::MonitorConfig;
use super::telegram::{TelegramAppConfig, MAX_MESSAGE_LEN};
use crate::adapter::outbound::sportsbook::SportsbookConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream sportsbook feed.
    #[serde(default)]
    pub source: SportsbookConfig,

    /// Monitor session behaviour.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Memory guard limits and cadence.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Telegram chat surface.
    #[serde(default)]
    pub telegram: TelegramAppConfig,
}

impl Config {
    /// Parse configuration from TOML content, applying process environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, an override cannot be
    /// parsed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration from TOML content with overrides read through
    /// `env`. Unset or blank variables leave the file value in place.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    #[allow(clippy::result_large_err)]
    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(token) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(raw) = var("ALLOWED_USER_IDS") {
            self.telegram.allowed_user_ids = parse_id_list("ALLOWED_USER_IDS", &raw)?;
        }
        if let Some(raw) = var("ADMIN_USER_IDS") {
            self.telegram.admin_user_ids = parse_id_list("ADMIN_USER_IDS", &raw)?;
        }
        if let Some(raw) = var("MAX_MEMORY_MB") {
            self.memory.max_mb = parse_number("MAX_MEMORY_MB", &raw)?;
        }
        if let Some(raw) = var("MEMORY_CHECK_INTERVAL") {
            self.memory.check_interval_secs = parse_number("MEMORY_CHECK_INTERVAL", &raw)?;
        }
        if let Some(raw) = var("MONITOR_INTERVAL") {
            self.monitor.poll_interval_secs = parse_number("MONITOR_INTERVAL", &raw)?;
        }
        if let Some(raw) = var("ODDS_CHANGE_THRESHOLD") {
            self.monitor.tolerance = Decimal::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                field: "ODDS_CHANGE_THRESHOLD",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.source.base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        url::Url::parse(&self.source.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if self.source.brand.is_empty() {
            return Err(ConfigError::MissingField { field: "brand" }.into());
        }

        let monitor = &self.monitor;
        if monitor.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be greater than 0"));
        }
        if monitor.failure_threshold == 0 {
            return Err(invalid("failure_threshold", "must be greater than 0"));
        }
        if monitor.max_sessions == 0 {
            return Err(invalid("max_sessions", "must be greater than 0"));
        }
        if monitor.tolerance < Decimal::ZERO {
            return Err(invalid("tolerance", "must be 0 or greater"));
        }
        if monitor.stop_timeout_ms == 0 || monitor.shutdown_timeout_ms == 0 {
            return Err(invalid("stop_timeout_ms", "timeouts must be greater than 0"));
        }

        if self.memory.check_interval_secs == 0 {
            return Err(invalid("check_interval_secs", "must be greater than 0"));
        }
        self.memory
            .limits()
            .map_err(|e| ConfigError::InvalidValue {
                field: "memory_limits",
                reason: e.to_string(),
            })?;

        let chunk = self.telegram.message_chunk_len;
        if chunk == 0 || chunk > MAX_MESSAGE_LEN {
            return Err(ConfigError::InvalidValue {
                field: "message_chunk_len",
                reason: format!("must be between 1 and {MAX_MESSAGE_LEN}"),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> std::result::Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}

/// Comma-separated chat ids; blanks between commas are ignored.
fn parse_id_list(field: &'static str, raw: &str) -> std::result::Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_number(field, part))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse_toml_with_env("", env(&[])).unwrap();
        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.memory.max_mb, 450);
        assert!(config.telegram.enabled);
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            [logging]
            level = "debug"
            format = "json"

            [monitor]
            poll_interval_secs = 10
            failure_threshold = 3
            tolerance = "0.10"
            delist_flap_window_secs = 120

            [memory]
            soft_limit_mb = 200
            hard_limit_mb = 300

            [source]
            language = "de"
        "#;
        let config = Config::parse_toml_with_env(toml, env(&[])).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.monitor.failure_threshold, 3);
        assert_eq!(config.monitor.tolerance, dec!(0.10));
        assert_eq!(config.monitor.delist_flap_window_secs, 120);
        assert_eq!(config.memory.hard_mb(), 300);
        assert_eq!(config.source.language, "de");
        assert_eq!(config.source.brand, SportsbookConfig::default().brand);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = Config::parse_toml_with_env(
            "[monitor]\npoll_interval_secs = 60\n",
            env(&[
                ("TELEGRAM_BOT_TOKEN", "123:abc"),
                ("ALLOWED_USER_IDS", "1, 2,,3"),
                ("ADMIN_USER_IDS", "1"),
                ("MAX_MEMORY_MB", "1000"),
                ("MEMORY_CHECK_INTERVAL", "60"),
                ("MONITOR_INTERVAL", "15"),
                ("ODDS_CHANGE_THRESHOLD", "0.2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.allowed_user_ids, vec![1, 2, 3]);
        assert_eq!(config.telegram.admin_user_ids, vec![1]);
        assert_eq!((config.memory.soft_mb(), config.memory.hard_mb()), (700, 900));
        assert_eq!(config.memory.check_interval_secs, 60);
        assert_eq!(config.monitor.poll_interval_secs, 15);
        assert_eq!(config.monitor.tolerance, dec!(0.2));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let config =
            Config::parse_toml_with_env("", env(&[("ALLOWED_USER_IDS", "  "), ("MONITOR_INTERVAL", "")]))
                .unwrap();
        assert!(config.telegram.allowed_user_ids.is_empty());
        assert_eq!(config.monitor.poll_interval_secs, 30);
    }

    #[test]
    fn malformed_id_list_is_rejected() {
        let err = Config::parse_toml_with_env("", env(&[("ALLOWED_USER_IDS", "1,abc")])).unwrap_err();
        assert!(err.to_string().contains("ALLOWED_USER_IDS"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err =
            Config::parse_toml_with_env("[monitor]\npoll_interval_secs = 0\n", env(&[])).unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn inverted_memory_limits_are_rejected() {
        let toml = "[memory]\nsoft_limit_mb = 500\nhard_limit_mb = 400\n";
        let err = Config::parse_toml_with_env(toml, env(&[])).unwrap_err();
        assert!(err.to_string().contains("memory_limits"));
    }

    #[test]
    fn oversized_memory_budget_is_rejected() {
        let err = Config::parse_toml_with_env(
            "[telegram]\nenabled = false\n",
            env(&[("MAX_MEMORY_MB", "999999999999999999")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::InvalidValue {
                field: "memory_limits",
                ..
            })
        ));
    }

    #[test]
    fn oversized_explicit_limit_is_rejected() {
        let toml = "[memory]\nsoft_limit_mb = 100\nhard_limit_mb = 99999999999999999\n";
        let err = Config::parse_toml_with_env(toml, env(&[])).unwrap_err();
        assert!(err.to_string().contains("memory_limits"));
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        let err = Config::parse_toml_with_env("[source]\nbase_url = \"not a url\"\n", env(&[]))
            .unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn oversized_chunk_length_is_rejected() {
        let err = Config::parse_toml_with_env("[telegram]\nmessage_chunk_len = 5000\n", env(&[]))
            .unwrap_err();
        assert!(err.to_string().contains("message_chunk_len"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml_with_env("[monitor\n", env(&[])).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Parse(_))));
    }
}
