//! Telegram chat surface configuration.

use serde::Deserialize;

/// `[telegram]` section.
///
/// The bot token and the user lists only come from the environment
/// (`TELEGRAM_BOT_TOKEN`, `ALLOWED_USER_IDS`, `ADMIN_USER_IDS`).
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Run the bot as part of `oddswatch run`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Matches listed by `/odds`.
    #[serde(default = "default_odds_display_limit")]
    pub odds_display_limit: usize,
    /// Changes listed per notification.
    #[serde(default = "default_change_display_limit")]
    pub change_display_limit: usize,
    /// Longer messages are split on line boundaries.
    #[serde(default = "default_message_chunk_len")]
    pub message_chunk_len: usize,
    #[serde(skip)]
    pub bot_token: Option<String>,
    /// Chats allowed to use the bot; empty allows everyone.
    #[serde(skip)]
    pub allowed_user_ids: Vec<i64>,
    /// Chats allowed to run admin commands.
    #[serde(skip)]
    pub admin_user_ids: Vec<i64>,
}

const fn default_enabled() -> bool {
    true
}

const fn default_odds_display_limit() -> usize {
    20
}

const fn default_change_display_limit() -> usize {
    10
}

/// Telegram caps messages at 4096 characters.
pub const MAX_MESSAGE_LEN: usize = 4096;

const fn default_message_chunk_len() -> usize {
    4000
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            odds_display_limit: default_odds_display_limit(),
            change_display_limit: default_change_display_limit(),
            message_chunk_len: default_message_chunk_len(),
            bot_token: None,
            allowed_user_ids: Vec::new(),
            admin_user_ids: Vec::new(),
        }
    }
}
