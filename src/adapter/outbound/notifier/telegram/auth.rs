//! Authorization for Telegram command handling.

use std::collections::HashSet;

use tracing::warn;

use crate::domain::SubscriberId;

use super::command::{command_help, parse_command, CommandParseError};
use super::control::TelegramControl;

const UNAUTHORIZED: &str = "❌ Sorry, you are not allowed to use this bot.";
const ADMIN_ONLY: &str = "❌ This command is restricted to administrators.";

/// Who may talk to the bot.
///
/// Ids are chat ids, which equal user ids in private chats. An empty allow
/// list admits everyone; admins are always admitted.
#[derive(Debug, Clone, Default)]
pub struct Access {
    allowed: HashSet<i64>,
    admins: HashSet<i64>,
}

impl Access {
    pub fn new(allowed: impl IntoIterator<Item = i64>, admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            admins: admins.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn allows_everyone(&self) -> bool {
        self.allowed.is_empty()
    }

    #[must_use]
    pub fn is_allowed(&self, chat: SubscriberId) -> bool {
        self.allows_everyone() || self.allowed.contains(&chat.get()) || self.is_admin(chat)
    }

    #[must_use]
    pub fn is_admin(&self, chat: SubscriberId) -> bool {
        self.admins.contains(&chat.get())
    }
}

/// Process a message and return a response if it is a command.
///
/// Returns `None` for messages that are not commands (don't start with `/`).
/// Unauthorized chats get a refusal instead of the command's output.
pub async fn command_response_for_message(
    text: &str,
    chat: SubscriberId,
    control: &TelegramControl,
) -> Option<String> {
    let parsed = parse_command(text);
    if matches!(parsed, Err(CommandParseError::NotACommand)) {
        return None;
    }

    let access = control.access();
    if !access.is_allowed(chat) {
        warn!(chat_id = chat.get(), "Refusing Telegram command from unauthorized chat");
        return Some(UNAUTHORIZED.to_string());
    }

    match parsed {
        Ok(command) if command.requires_admin() && !access.is_admin(chat) => {
            warn!(chat_id = chat.get(), ?command, "Refusing admin command");
            Some(ADMIN_ONLY.to_string())
        }
        Ok(command) => Some(control.execute(chat, command).await),
        Err(err) => Some(format!("Invalid command: {err}\n\n{}", command_help())),
    }
}
