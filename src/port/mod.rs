//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!        ┌──────────────┐   MonitorControl   ┌──────────────────┐
//!        │ CLI/Telegram ├───────────────────►│   Application    │
//!        └──────────────┘                    │ registry + guard │
//!                                            └───┬─────┬─────┬──┘
//!                              OddsSource ◄──────┘     │     └──────► MemoryProbe
//!                                                  Notifier
//! ```
//!
//! - [`inbound`]: capabilities the application exposes to drivers.
//! - [`outbound`]: collaborators the application drives.

pub mod inbound;
pub mod outbound;
