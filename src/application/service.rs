//! The service behind the `MonitorControl` port.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::{HealthReport, Liveness, MemoryState, OddsSnapshot, SessionSummary, SubscriberId};
use crate::error::{FetchError, StartError};
use crate::port::inbound::{MonitorControl, StopOutcome};
use crate::port::outbound::OddsSource;

use super::health::build_health_report;
use super::memory::MemoryGuard;
use super::monitor::MonitorRegistry;

/// Ties the registry, the memory guard and the odds source together for
/// the command surfaces.
pub struct MonitorService {
    registry: Arc<MonitorRegistry>,
    guard: Arc<MemoryGuard>,
    source: Arc<dyn OddsSource>,
    guard_enabled: bool,
    started_at: Instant,
}

impl MonitorService {
    #[must_use]
    pub fn new(
        registry: Arc<MonitorRegistry>,
        guard: Arc<MemoryGuard>,
        source: Arc<dyn OddsSource>,
        guard_enabled: bool,
    ) -> Self {
        Self {
            registry,
            guard,
            source,
            guard_enabled,
            started_at: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<MonitorRegistry> {
        &self.registry
    }

    pub fn guard(&self) -> &Arc<MemoryGuard> {
        &self.guard
    }
}

#[async_trait]
impl MonitorControl for MonitorService {
    async fn start_monitor(&self, subscriber: SubscriberId) -> Result<SessionSummary, StartError> {
        self.registry.start(subscriber).await
    }

    async fn stop_monitor(&self, subscriber: SubscriberId) -> StopOutcome {
        self.registry.stop(subscriber).await
    }

    fn status(&self, subscriber: SubscriberId) -> Option<SessionSummary> {
        self.registry.status(subscriber)
    }

    fn list_active(&self) -> Vec<SubscriberId> {
        self.registry.list_active()
    }

    async fn all_odds(&self) -> Result<OddsSnapshot, FetchError> {
        self.source.fetch_current_odds().await
    }

    fn memory_state(&self) -> MemoryState {
        self.guard.state()
    }

    fn cleanup_now(&self) -> MemoryState {
        // A disabled guard reclaims but never sheds.
        if self.guard_enabled {
            self.guard.cleanup_now()
        } else {
            self.guard.reclaim_only()
        }
    }

    fn health(&self) -> HealthReport {
        build_health_report(
            &self.guard.state(),
            &self.guard.gate(),
            self.guard_enabled,
            self.guard.is_running(),
        )
    }

    fn liveness(&self) -> Liveness {
        let report = self.health();
        Liveness::new(
            &report,
            self.registry.active_count(),
            self.guard.state().level(),
            self.started_at.elapsed(),
        )
    }
}
