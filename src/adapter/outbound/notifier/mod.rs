//! Notification adapters.
//!
//! Implements the `port::outbound::Notifier` trait for chat backends.

#[cfg(feature = "telegram")]
pub mod telegram;
