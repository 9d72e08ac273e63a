//! Monitor control port for driving adapters.
//!
//! Keeps the chat surface and the CLI decoupled from the concrete
//! registry and memory guard.

use async_trait::async_trait;

use crate::domain::{HealthReport, Liveness, MemoryState, OddsSnapshot, SessionSummary, SubscriberId};
use crate::error::{FetchError, StartError};

/// Result of a stop request. Stopping nothing is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(SessionSummary),
    NotRunning,
}

/// Operations the core offers to the command surfaces.
#[async_trait]
pub trait MonitorControl: Send + Sync {
    /// Start a monitor for `subscriber`; resolves once the baseline is taken.
    async fn start_monitor(&self, subscriber: SubscriberId) -> Result<SessionSummary, StartError>;

    async fn stop_monitor(&self, subscriber: SubscriberId) -> StopOutcome;

    fn status(&self, subscriber: SubscriberId) -> Option<SessionSummary>;

    fn list_active(&self) -> Vec<SubscriberId>;

    /// One-shot fetch that bypasses the session machinery.
    async fn all_odds(&self) -> Result<OddsSnapshot, FetchError>;

    fn memory_state(&self) -> MemoryState;

    /// Force a reclamation pass and return the refreshed state.
    fn cleanup_now(&self) -> MemoryState;

    fn health(&self) -> HealthReport;

    fn liveness(&self) -> Liveness;
}
