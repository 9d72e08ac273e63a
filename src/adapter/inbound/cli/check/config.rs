//! `check config`: parse, apply environment overrides, validate.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::Config;

pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "path": config_path.display().to_string(),
            "valid": true,
            "poll_interval_secs": config.monitor.poll_interval_secs,
            "max_sessions": config.monitor.max_sessions,
            "tolerance": config.monitor.tolerance,
            "memory": {
                "enabled": config.memory.enabled,
                "soft_limit_mb": config.memory.soft_mb(),
                "hard_limit_mb": config.memory.hard_mb(),
            },
            "telegram": {
                "enabled": config.telegram.enabled,
                "token_set": config.telegram.bot_token.is_some(),
                "allowed_users": config.telegram.allowed_user_ids.len(),
                "admins": config.telegram.admin_user_ids.len(),
            },
        }));
        return Ok(());
    }

    output::section("Configuration");
    output::field("File", config_path.display());
    output::field("Feed", &config.source.base_url);
    output::field("Poll interval", format!("{}s", config.monitor.poll_interval_secs));
    output::field("Fail threshold", config.monitor.failure_threshold);
    output::field("Max sessions", config.monitor.max_sessions);
    output::field("Tolerance", config.monitor.tolerance);
    output::field(
        "Memory",
        if config.memory.enabled {
            format!("{} MB soft / {} MB hard", config.memory.soft_mb(), config.memory.hard_mb())
        } else {
            "guard disabled".to_string()
        },
    );

    if config.telegram.enabled {
        if config.telegram.bot_token.is_none() {
            output::warning("TELEGRAM_BOT_TOKEN is not set, `run` will refuse to start");
        }
        if config.telegram.allowed_user_ids.is_empty() {
            output::warning("ALLOWED_USER_IDS is empty, every chat may use the bot");
        }
    } else {
        output::field("Telegram", "disabled");
    }

    output::success("Configuration is valid");
    Ok(())
}
