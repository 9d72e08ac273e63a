use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::application::memory::AdmissionGate;
use crate::domain::{ChangeKind, SessionState, StopReason, SubscriberId};
use crate::error::{CapacityError, DeliveryError, FetchError, StartError};
use crate::port::inbound::StopOutcome;
use crate::port::outbound::{Notification, Notifier};
use crate::testkit;
use crate::testkit::notifier::RecordingNotifier;
use crate::testkit::source::ScriptedSource;

// -- Helpers --------------------------------------------------------------

struct Fixture {
    registry: Arc<MonitorRegistry>,
    source: Arc<ScriptedSource>,
    notifier: RecordingNotifier,
    gate: Arc<AdmissionGate>,
}

fn fixture(source: ScriptedSource, settings: MonitorSettings) -> Fixture {
    let source = Arc::new(source);
    let notifier = RecordingNotifier::new();
    let gate = Arc::new(AdmissionGate::new());
    let registry = Arc::new(MonitorRegistry::new(
        settings,
        source.clone(),
        Arc::new(notifier.clone()),
        gate.clone(),
    ));
    Fixture {
        registry,
        source,
        notifier,
        gate,
    }
}

fn steady() -> ScriptedSource {
    ScriptedSource::steady(testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1)))
}

fn sub(id: i64) -> SubscriberId {
    SubscriberId::new(id)
}

/// Notifier whose deliveries never finish.
#[derive(Default)]
struct StuckNotifier {
    entered: AtomicBool,
}

#[async_trait]
impl Notifier for StuckNotifier {
    async fn deliver(&self, _: SubscriberId, _: Notification) -> Result<(), DeliveryError> {
        self.entered.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    done()
}

// -- Admission ------------------------------------------------------------

#[tokio::test]
async fn test_start_runs_after_baseline() {
    let f = fixture(steady(), testkit::config::monitor_settings());

    let summary = f.registry.start(sub(1)).await.unwrap();

    assert_eq!(summary.state, SessionState::Running);
    assert_eq!(summary.stats.match_count, 1);
    assert_eq!(f.registry.list_active(), vec![sub(1)]);
    assert_eq!(f.source.fetch_count(), 1);
}

#[tokio::test]
async fn test_second_start_for_same_subscriber_is_rejected() {
    let f = fixture(steady(), testkit::config::monitor_settings());

    f.registry.start(sub(1)).await.unwrap();
    let err = f.registry.start(sub(1)).await.unwrap_err();

    assert_eq!(err, StartError::AlreadyRunning);
    assert_eq!(f.registry.active_count(), 1);
}

#[tokio::test]
async fn test_concurrent_starts_admit_exactly_one() {
    let f = fixture(
        steady().with_delay(Duration::from_millis(30)),
        testkit::config::monitor_settings(),
    );

    let (a, b) = tokio::join!(f.registry.start(sub(7)), f.registry.start(sub(7)));

    let results = [a, b];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let dup = results
        .iter()
        .filter(|r| matches!(r, Err(StartError::AlreadyRunning)))
        .count();
    assert_eq!((ok, dup), (1, 1));
    assert_eq!(f.registry.active_count(), 1);
}

#[tokio::test]
async fn test_capacity_is_enforced_and_released_by_stop() {
    let mut settings = testkit::config::monitor_settings();
    settings.max_sessions = 2;
    let f = fixture(steady(), settings);

    f.registry.start(sub(1)).await.unwrap();
    f.registry.start(sub(2)).await.unwrap();

    let err = f.registry.start(sub(3)).await.unwrap_err();
    assert_eq!(
        err,
        StartError::Capacity(CapacityError::GlobalLimit {
            active: 2,
            limit: 2
        })
    );

    assert!(matches!(f.registry.stop(sub(1)).await, StopOutcome::Stopped(_)));
    assert!(f.registry.start(sub(3)).await.is_ok());
}

#[tokio::test]
async fn test_baseline_failure_never_starts_session() {
    let f = fixture(
        ScriptedSource::failing(FetchError::Empty),
        testkit::config::monitor_settings(),
    );

    let err = f.registry.start(sub(1)).await.unwrap_err();

    assert_eq!(err, StartError::Baseline(FetchError::Empty));
    assert!(f.registry.status(sub(1)).is_none());
    assert_eq!(f.registry.active_count(), 0);
}

#[tokio::test]
async fn test_memory_pressure_rejects_new_but_keeps_existing() {
    let f = fixture(steady(), testkit::config::monitor_settings());
    f.registry.start(sub(1)).await.unwrap();

    f.gate.close("resident above hard limit");
    let err = f.registry.start(sub(2)).await.unwrap_err();

    assert!(matches!(
        err,
        StartError::Capacity(CapacityError::MemoryPressure { .. })
    ));
    let polls_before = f.registry.status(sub(1)).unwrap().stats.polls;
    assert!(
        wait_until(Duration::from_secs(2), || {
            f.registry.status(sub(1)).unwrap().stats.polls > polls_before
        })
        .await
    );
    assert_eq!(f.registry.status(sub(1)).unwrap().state, SessionState::Running);
}

// -- Poll loop ------------------------------------------------------------

#[tokio::test]
async fn test_changes_are_delivered_in_order() {
    let base = testkit::domain::one_match("1", dec!(1.50), dec!(3.20), dec!(4.10));
    let moved = testkit::domain::snapshot(vec![
        testkit::domain::match_odds("1", dec!(1.55), dec!(3.20), dec!(4.10)),
        testkit::domain::match_odds("2", dec!(2.00), dec!(3.00), dec!(2.50)),
    ]);
    let source = ScriptedSource::steady(moved.clone()).then(vec![Ok(base)]);
    let f = fixture(source, testkit::config::monitor_settings());

    f.registry.start(sub(1)).await.unwrap();
    assert!(f.notifier.wait_for(1, Duration::from_secs(2)).await);

    let batches = f.notifier.change_batches(sub(1));
    let kinds: Vec<_> = batches[0].iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Moved, ChangeKind::Listed]);

    // steady state afterwards: no further deliveries
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(f.notifier.len(), 1);
    let summary = f.registry.status(sub(1)).unwrap();
    assert_eq!(summary.stats.changes_delivered, 2);
    assert_eq!(summary.stats.match_count, 2);
}

#[tokio::test]
async fn test_fatal_threshold_auto_stops_with_legible_status() {
    let base = testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1));
    let source = ScriptedSource::failing(FetchError::Malformed("bad json".into())).then(vec![Ok(base)]);
    let mut settings = testkit::config::monitor_settings();
    settings.failure_threshold = 3;
    let f = fixture(source, settings);

    f.registry.start(sub(1)).await.unwrap();
    assert!(f.notifier.wait_for(1, Duration::from_secs(2)).await);

    let summary = f.registry.status(sub(1)).expect("auto-stopped session stays queryable");
    assert_eq!(summary.state, SessionState::Stopped);
    assert!(summary.is_auto_stopped());
    assert_eq!(summary.stats.consecutive_failures, 3);
    assert!(matches!(
        summary.stop_reason,
        Some(StopReason::TooManyFailures { failures: 3, .. })
    ));
    assert_eq!(f.notifier.auto_stops(sub(1)).len(), 1);
    assert!(f.registry.list_active().is_empty());
    assert_eq!(f.source.fetch_count(), 4);
}

#[tokio::test]
async fn test_success_resets_consecutive_failures() {
    let base = testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1));
    let source = ScriptedSource::steady(base.clone()).then(vec![
        Ok(base.clone()),
        Err(FetchError::Timeout(Duration::from_secs(1))),
        Err(FetchError::Empty),
        Ok(base),
    ]);
    let mut settings = testkit::config::monitor_settings();
    settings.failure_threshold = 3;
    let f = fixture(source, settings);

    f.registry.start(sub(1)).await.unwrap();
    assert!(
        wait_until(Duration::from_secs(2), || {
            f.registry.status(sub(1)).unwrap().stats.polls >= 4
        })
        .await
    );

    let summary = f.registry.status(sub(1)).unwrap();
    assert_eq!(summary.state, SessionState::Running);
    assert_eq!(summary.stats.consecutive_failures, 0);
    assert_eq!(summary.stats.total_failures, 2);
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_session() {
    let base = testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1));
    let moved = testkit::domain::one_match("1", dec!(1.7), dec!(3.2), dec!(4.1));
    let source = ScriptedSource::steady(moved).then(vec![Ok(base)]);
    let f = fixture(source, testkit::config::monitor_settings());
    f.notifier.set_failing(true);

    f.registry.start(sub(1)).await.unwrap();
    assert!(f.notifier.wait_for(1, Duration::from_secs(2)).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let summary = f.registry.status(sub(1)).unwrap();
    assert_eq!(summary.state, SessionState::Running);
    assert_eq!(summary.stats.delivery_failures, 1);
    assert_eq!(summary.stats.changes_delivered, 0);
}

#[tokio::test]
async fn test_repeated_delisting_inside_flap_window_is_reported_once() {
    let both = testkit::domain::snapshot(vec![
        testkit::domain::match_odds("1", dec!(1.5), dec!(3.2), dec!(4.1)),
        testkit::domain::match_odds("2", dec!(2.0), dec!(3.0), dec!(2.5)),
    ]);
    let only_first = testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1));
    // baseline, delist, relist, delist again, then steady
    let source = ScriptedSource::steady(only_first.clone()).then(vec![
        Ok(both.clone()),
        Ok(only_first),
        Ok(both),
    ]);
    let mut settings = testkit::config::monitor_settings();
    settings.delist_flap_window = Duration::from_secs(3_600);
    let f = fixture(source, settings);

    f.registry.start(sub(1)).await.unwrap();
    assert!(wait_until(Duration::from_secs(2), || f.source.fetch_count() >= 6).await);

    let kinds: Vec<ChangeKind> = f
        .notifier
        .change_batches(sub(1))
        .into_iter()
        .flatten()
        .map(|c| c.kind)
        .collect();
    assert_eq!(kinds, vec![ChangeKind::Delisted, ChangeKind::Listed]);
}

// -- Stop and shutdown ----------------------------------------------------

#[tokio::test]
async fn test_stop_interrupts_inter_poll_wait() {
    let mut settings = testkit::config::monitor_settings();
    settings.poll_interval = Duration::from_secs(30);
    let f = fixture(steady(), settings);
    f.registry.start(sub(1)).await.unwrap();

    let started = Instant::now();
    let outcome = f.registry.stop(sub(1)).await;

    assert!(started.elapsed() < Duration::from_secs(1));
    let StopOutcome::Stopped(summary) = outcome else {
        panic!("expected stopped outcome");
    };
    assert_eq!(summary.state, SessionState::Stopped);
    assert_eq!(summary.stop_reason, Some(StopReason::UserRequested));
    assert!(!summary.is_auto_stopped());
}

#[tokio::test]
async fn test_stop_interrupts_in_flight_fetch() {
    let f = fixture(steady(), testkit::config::monitor_settings());
    f.registry.start(sub(1)).await.unwrap();

    f.source.set_delay(Duration::from_secs(30));
    let fetches = f.source.fetch_count();
    assert!(wait_until(Duration::from_secs(1), || f.source.fetch_count() > fetches).await);

    let started = Instant::now();
    assert!(matches!(f.registry.stop(sub(1)).await, StopOutcome::Stopped(_)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_stop_during_baseline_cancels_start() {
    let f = fixture(
        steady().with_delay(Duration::from_secs(30)),
        testkit::config::monitor_settings(),
    );

    let registry = Arc::clone(&f.registry);
    let start = tokio::spawn(async move { registry.start(sub(1)).await });
    assert!(wait_until(Duration::from_secs(1), || f.source.fetch_count() == 1).await);

    assert!(matches!(f.registry.stop(sub(1)).await, StopOutcome::Stopped(_)));
    let result = tokio::time::timeout(Duration::from_secs(1), start)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.unwrap_err(), StartError::Cancelled);
    assert_eq!(f.registry.status(sub(1)).unwrap().state, SessionState::Stopped);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let f = fixture(steady(), testkit::config::monitor_settings());

    assert_eq!(f.registry.stop(sub(9)).await, StopOutcome::NotRunning);

    f.registry.start(sub(9)).await.unwrap();
    assert!(matches!(f.registry.stop(sub(9)).await, StopOutcome::Stopped(_)));
    assert_eq!(f.registry.stop(sub(9)).await, StopOutcome::NotRunning);
}

#[tokio::test]
async fn test_restart_replaces_stopped_entry() {
    let f = fixture(steady(), testkit::config::monitor_settings());

    let first = f.registry.start(sub(1)).await.unwrap();
    f.registry.stop(sub(1)).await;
    let second = f.registry.start(sub(1)).await.unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(f.registry.status(sub(1)).unwrap().session_id, second.session_id);
}

#[tokio::test]
async fn test_shutdown_all_stops_every_session() {
    let mut settings = testkit::config::monitor_settings();
    settings.poll_interval = Duration::from_secs(30);
    let f = fixture(steady(), settings);
    for id in 1..=3 {
        f.registry.start(sub(id)).await.unwrap();
    }

    let started = Instant::now();
    f.registry.shutdown_all().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(f.registry.list_active().is_empty());
    for id in 1..=3 {
        let summary = f.registry.status(sub(id)).unwrap();
        assert_eq!(summary.state, SessionState::Stopped);
        assert_eq!(summary.stop_reason, Some(StopReason::Shutdown));
    }
}

#[tokio::test]
async fn test_prune_drops_only_expired_stopped_entries() {
    let mut settings = testkit::config::monitor_settings();
    settings.stopped_retention = Duration::ZERO;
    let f = fixture(steady(), settings);

    f.registry.start(sub(1)).await.unwrap();
    f.registry.start(sub(2)).await.unwrap();
    f.registry.stop(sub(1)).await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(f.registry.prune_stopped(), 1);
    assert!(f.registry.status(sub(1)).is_none());
    assert!(f.registry.status(sub(2)).is_some());
}

#[tokio::test]
async fn test_shutdown_all_aborts_sessions_stuck_past_timeout() {
    let base = testkit::domain::one_match("1", dec!(1.5), dec!(3.2), dec!(4.1));
    let moved = testkit::domain::one_match("1", dec!(1.9), dec!(3.2), dec!(4.1));
    let source = Arc::new(ScriptedSource::steady(moved).then(vec![Ok(base)]));
    let notifier = Arc::new(StuckNotifier::default());
    let mut settings = testkit::config::monitor_settings();
    settings.shutdown_timeout = Duration::from_millis(100);
    let registry = MonitorRegistry::new(
        settings,
        source,
        notifier.clone(),
        Arc::new(AdmissionGate::new()),
    );

    registry.start(sub(1)).await.unwrap();
    assert!(wait_until(Duration::from_secs(2), || notifier.entered.load(Ordering::SeqCst)).await);

    let started = Instant::now();
    registry.shutdown_all().await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_secs(5));
    let summary = registry.status(sub(1)).unwrap();
    assert_eq!(summary.state, SessionState::Stopped);
    assert_eq!(summary.stop_reason, Some(StopReason::Shutdown));
    assert!(registry.list_active().is_empty());
}

#[tokio::test]
async fn test_start_after_shutdown_is_refused() {
    let f = fixture(steady(), testkit::config::monitor_settings());
    f.registry.start(sub(1)).await.unwrap();

    f.registry.shutdown_all().await;

    assert_eq!(
        f.registry.start(sub(2)).await.unwrap_err(),
        StartError::ShuttingDown
    );
    assert!(f.registry.status(sub(2)).is_none());
}
