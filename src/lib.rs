//! oddswatch - live football odds change monitor.
//!
//! Polls a sportsbook live feed for full-time 1X2 prices, diffs successive
//! snapshots per subscriber and pushes movements, new listings and
//! delistings to chat subscribers. A memory guard sheds new monitors under
//! pressure instead of letting the host kill the process.
//!
//! # Architecture
//!
//! - [`domain`] - Snapshots, diffing, sessions and memory state
//! - [`port`] - Traits at the seams: odds source, notifier, memory probe
//! - [`application`] - Monitor registry, memory guard, health reporting
//! - [`adapter`] - Sportsbook client, Telegram bot, procfs probe, CLI
//! - [`infrastructure`] - Configuration, wiring and runtime lifecycle
//!
//! # Features
//!
//! - `telegram` (default) - Telegram notifier and command surface
//! - `testkit` - Test doubles for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
