//! A fully wired [`MonitorService`] over test doubles.

use std::sync::Arc;

use crate::application::memory::{AdmissionGate, MemoryGuard};
use crate::application::monitor::MonitorRegistry;
use crate::application::MonitorService;
use crate::port::outbound::Reclaim;

use super::config::{memory_check_interval, memory_limits, monitor_settings};
use super::memory::FixedMemoryProbe;
use super::notifier::RecordingNotifier;
use super::source::ScriptedSource;

/// Service with fast monitor settings, the canonical memory limits and the
/// registry registered as the guard's only reclaimer. The guard task is
/// not spawned; call `sample()`/`maybe_cleanup()` on `service.guard()`.
pub fn monitor_service(
    source: Arc<ScriptedSource>,
    notifier: RecordingNotifier,
    probe: Arc<FixedMemoryProbe>,
) -> Arc<MonitorService> {
    let gate = Arc::new(AdmissionGate::new());
    let guard = Arc::new(MemoryGuard::new(
        probe,
        memory_limits(),
        Arc::clone(&gate),
        memory_check_interval(),
    ));
    let registry = Arc::new(MonitorRegistry::new(
        monitor_settings(),
        source.clone(),
        Arc::new(notifier),
        gate,
    ));
    guard.register(Arc::clone(&registry) as Arc<dyn Reclaim>);

    Arc::new(MonitorService::new(registry, guard, source, false))
}
