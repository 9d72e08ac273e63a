//! Telegram command execution against the monitor control port.

use std::sync::Arc;

use crate::domain::SubscriberId;
use crate::port::inbound::MonitorControl;

use super::auth::Access;
use super::command::{command_help, TelegramCommand};
use super::format::{
    format_health, format_memory, format_snapshot, format_start_error, format_started,
    format_status, format_stopped,
};

const WELCOME: &str = "⚽ Football odds monitor\n\n\
    I watch live 1X2 odds and message you when they move.";

/// Command executor for the Telegram chat surface.
#[derive(Clone)]
pub struct TelegramControl {
    monitor: Arc<dyn MonitorControl>,
    access: Access,
    /// Default number of matches listed by `/odds`.
    odds_display_limit: usize,
}

impl TelegramControl {
    #[must_use]
    pub fn new(monitor: Arc<dyn MonitorControl>, access: Access, odds_display_limit: usize) -> Self {
        Self {
            monitor,
            access,
            odds_display_limit,
        }
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    pub fn monitor(&self) -> &Arc<dyn MonitorControl> {
        &self.monitor
    }

    /// Execute one parsed command for `chat` and return response text.
    pub async fn execute(&self, chat: SubscriberId, command: TelegramCommand) -> String {
        match command {
            TelegramCommand::Start => format!("{WELCOME}\n\n{}", command_help()),
            TelegramCommand::Help => command_help().to_string(),
            TelegramCommand::Odds { limit } => match self.monitor.all_odds().await {
                Ok(snapshot) => format_snapshot(&snapshot, limit.unwrap_or(self.odds_display_limit)),
                Err(e) => format!("❌ Failed to fetch odds: {e}"),
            },
            TelegramCommand::Monitor => match self.monitor.start_monitor(chat).await {
                Ok(summary) => format_started(&summary),
                Err(e) => format_start_error(&e),
            },
            TelegramCommand::Stop => format_stopped(&self.monitor.stop_monitor(chat).await),
            TelegramCommand::Status => format_status(
                self.monitor.status(chat).as_ref(),
                self.monitor.list_active().len(),
                &self.monitor.memory_state(),
            ),
            TelegramCommand::Memory => format_memory(&self.monitor.memory_state()),
            TelegramCommand::Health => {
                format_health(&self.monitor.health(), &self.monitor.liveness())
            }
            TelegramCommand::Cleanup => {
                let state = self.monitor.cleanup_now();
                format!("🧹 Cleanup finished\n\n{}", format_memory(&state))
            }
        }
    }
}
