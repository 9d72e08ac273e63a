//! Telegram delivery and command listener.
//!
//! Provides the [`TelegramNotifier`] for sending change notifications to
//! subscriber chats and a background worker that serves bot commands.
//!
//! Requires the `telegram` feature to be enabled.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::{ApiError, RequestError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::SubscriberId;
use crate::error::DeliveryError;
use crate::port::inbound::MonitorControl;
use crate::port::outbound::{Notification, Notifier};

use super::auth::{command_response_for_message, Access};
use super::command::bot_commands;
use super::control::TelegramControl;
use super::format::{format_notification, split_message};

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Chats allowed to use the bot; empty allows everyone.
    pub allowed_user_ids: Vec<i64>,
    /// Chats allowed to run admin commands.
    pub admin_user_ids: Vec<i64>,
    /// Default number of matches listed by `/odds`.
    pub odds_display_limit: usize,
    /// Changes listed per notification.
    pub change_display_limit: usize,
    /// Maximum characters per sent message.
    pub message_chunk_len: usize,
}

impl TelegramConfig {
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            allowed_user_ids: Vec::new(),
            admin_user_ids: Vec::new(),
            odds_display_limit: 20,
            change_display_limit: 10,
            message_chunk_len: 4000,
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        Access::new(
            self.allowed_user_ids.iter().copied(),
            self.admin_user_ids.iter().copied(),
        )
    }
}

/// Telegram notifier that sends each delivery to the subscriber's chat.
pub struct TelegramNotifier {
    bot: Bot,
    config: TelegramConfig,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
            config,
        }
    }

    /// Spawn the background worker that answers bot commands.
    pub fn spawn_command_listener(&self, monitor: Arc<dyn MonitorControl>) -> JoinHandle<()> {
        let access = self.config.access();
        if access.allows_everyone() {
            warn!("ALLOWED_USER_IDS is empty, every Telegram user may use the bot");
        }
        let control = TelegramControl::new(monitor, access, self.config.odds_display_limit);
        tokio::spawn(telegram_command_worker(
            self.bot.clone(),
            control,
            self.config.message_chunk_len,
        ))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(
        &self,
        subscriber: SubscriberId,
        notification: Notification,
    ) -> Result<(), DeliveryError> {
        let text = format_notification(&notification, self.config.change_display_limit);
        send_chunks(
            &self.bot,
            ChatId(subscriber.get()),
            &text,
            self.config.message_chunk_len,
        )
        .await
        .map_err(|e| delivery_error(subscriber, e))
    }
}

async fn send_chunks(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    chunk_len: usize,
) -> Result<(), RequestError> {
    for chunk in split_message(text, chunk_len) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

fn delivery_error(subscriber: SubscriberId, err: RequestError) -> DeliveryError {
    match err {
        RequestError::Api(
            api @ (ApiError::BotBlocked
            | ApiError::ChatNotFound
            | ApiError::UserDeactivated
            | ApiError::BotKicked),
        ) => DeliveryError::Unreachable {
            subscriber: subscriber.get(),
            reason: api.to_string(),
        },
        other => DeliveryError::Rejected(other.to_string()),
    }
}

/// Background worker that handles inbound Telegram commands.
async fn telegram_command_worker(bot: Bot, control: TelegramControl, chunk_len: usize) {
    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            let chat = SubscriberId::new(msg.chat.id.0);
            if let Some(response) = command_response_for_message(text, chat, &control).await {
                if let Err(e) = send_chunks(&bot, msg.chat.id, &response, chunk_len).await {
                    error!(error = %e, chat_id = chat.get(), "Failed to send Telegram command response");
                }
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener stopped");
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
