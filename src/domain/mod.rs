//! Feed-agnostic domain types and the pure snapshot differ.

mod change;
mod diff;
mod flap;
mod health;
mod id;
mod memory;
mod odds;
mod session;

pub mod error;

pub use change::{ChangeKind, OddsChange};
pub use diff::SnapshotDiffer;
pub use flap::DelistFilter;
pub use health::{HealthCheck, HealthReport, HealthStatus, Liveness};
pub use id::{MatchKey, SessionId, SubscriberId};
pub use memory::{MemoryLevel, MemoryLimits, MemoryState};
pub use odds::{MatchOdds, OddsSnapshot, Prices};
pub use session::{SessionState, SessionStats, SessionSummary, StopReason};
