//! Telegram notification and command handling.
//!
//! Delivers change batches and auto-stop notices to subscriber chats and
//! serves the bot commands that start, stop and inspect monitors.

mod auth;
mod command;
mod format;

pub mod control;
pub mod notifier;

pub use auth::Access;
pub use control::TelegramControl;
pub use notifier::{TelegramConfig, TelegramNotifier};
