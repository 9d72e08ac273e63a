use std::sync::Arc;
use std::time::{Duration, Instant};

use oddswatch::application::MonitorService;
use oddswatch::domain::{OddsSnapshot, SubscriberId};
use oddswatch::testkit::memory::FixedMemoryProbe;
use oddswatch::testkit::notifier::RecordingNotifier;
use oddswatch::testkit::service::monitor_service;
use oddswatch::testkit::source::ScriptedSource;

pub struct Harness {
    pub service: Arc<MonitorService>,
    pub source: Arc<ScriptedSource>,
    pub notifier: RecordingNotifier,
    pub probe: Arc<FixedMemoryProbe>,
}

/// Service over a steady source, with memory well below the soft limit.
pub fn harness(snapshot: OddsSnapshot) -> Harness {
    let source = Arc::new(ScriptedSource::steady(snapshot));
    let notifier = RecordingNotifier::new();
    let probe = Arc::new(FixedMemoryProbe::mb(10));
    let service = monitor_service(Arc::clone(&source), notifier.clone(), Arc::clone(&probe));
    Harness {
        service,
        source,
        notifier,
        probe,
    }
}

pub fn sub(id: i64) -> SubscriberId {
    SubscriberId::new(id)
}

pub async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    done()
}
