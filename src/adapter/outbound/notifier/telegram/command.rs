//! Telegram command parsing.

/// Supported Telegram commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramCommand {
    Start,
    Help,
    /// Current odds, optionally capped to `limit` matches.
    Odds { limit: Option<usize> },
    Monitor,
    Stop,
    Status,
    Memory,
    Health,
    Cleanup,
}

impl TelegramCommand {
    /// Commands restricted to `ADMIN_USER_IDS`.
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(self, Self::Cleanup)
    }
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    InvalidNumber(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::InvalidNumber(value) => write!(f, "invalid number `{value}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<TelegramCommand, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(TelegramCommand::Start),
        "/help" => Ok(TelegramCommand::Help),
        "/odds" => {
            let limit = parts
                .next()
                .map(|raw| {
                    raw.parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| CommandParseError::InvalidNumber(raw.to_string()))
                })
                .transpose()?;
            Ok(TelegramCommand::Odds { limit })
        }
        "/monitor" => Ok(TelegramCommand::Monitor),
        "/stop" => Ok(TelegramCommand::Stop),
        "/status" => Ok(TelegramCommand::Status),
        "/memory" => Ok(TelegramCommand::Memory),
        "/health" => Ok(TelegramCommand::Health),
        "/cleanup" => Ok(TelegramCommand::Cleanup),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/start` and `/help`.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /odds [n] - 📊 Current football 1X2 odds\n\
    /monitor - 🚀 Notify me when odds change\n\
    /stop - ⏹️ Stop my monitor\n\
    /status - 🔍 My monitor and bot status\n\
    /memory - 💾 Memory usage\n\
    /health - 🏥 Health check\n\
    /cleanup - 🧹 Force a memory cleanup (admin)\n\
    /help - 📋 Show this help"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("odds", "Current football 1X2 odds"),
        ("monitor", "Notify me when odds change"),
        ("stop", "Stop my monitor"),
        ("status", "My monitor and bot status"),
        ("memory", "Memory usage"),
        ("health", "Health check"),
        ("cleanup", "Force a memory cleanup (admin)"),
        ("help", "Show all commands"),
    ]
}
