//! Sportsbook live-feed adapter.
//!
//! Implements [`OddsSource`](crate::port::outbound::OddsSource) over the
//! feed's version-probe and live-snapshot endpoints.

mod client;
mod dto;
mod parse;
mod settings;

pub use client::SportsbookClient;
pub use settings::SportsbookConfig;
