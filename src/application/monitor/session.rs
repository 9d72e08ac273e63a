//! One subscriber's polling loop and the state it shares with the registry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::{
    DelistFilter, OddsChange, OddsSnapshot, SessionId, SessionState, SessionStats, SessionSummary,
    SnapshotDiffer, StopReason, SubscriberId,
};
use crate::error::FetchError;
use crate::port::outbound::{Notification, Notifier, OddsSource};

/// Resolves once `rx` reads true or its sender is gone.
pub(super) async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

struct Record {
    state: SessionState,
    stats: SessionStats,
    stop_reason: Option<StopReason>,
    stopped_at: Option<DateTime<Utc>>,
}

/// State visible to both the session task and the registry.
///
/// Transitions are conditional so late arrivals (a stop racing an
/// auto-stop, a baseline finishing after a stop) cannot move a session
/// backwards.
pub(super) struct SessionShared {
    pub(super) subscriber: SubscriberId,
    pub(super) session_id: SessionId,
    created_at: DateTime<Utc>,
    poll_interval: Duration,
    record: Mutex<Record>,
}

impl SessionShared {
    pub(super) fn new(subscriber: SubscriberId, poll_interval: Duration) -> Self {
        Self {
            subscriber,
            session_id: SessionId::new(),
            created_at: Utc::now(),
            poll_interval,
            record: Mutex::new(Record {
                state: SessionState::Idle,
                stats: SessionStats::default(),
                stop_reason: None,
                stopped_at: None,
            }),
        }
    }

    pub(super) fn state(&self) -> SessionState {
        self.record.lock().state
    }

    pub(super) fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.record.lock().stopped_at
    }

    pub(super) fn summary(&self) -> SessionSummary {
        let record = self.record.lock();
        SessionSummary {
            subscriber: self.subscriber,
            session_id: self.session_id.clone(),
            state: record.state,
            created_at: self.created_at,
            poll_interval: self.poll_interval,
            stats: record.stats.clone(),
            stop_reason: record.stop_reason.clone(),
            stopped_at: record.stopped_at,
        }
    }

    /// Idle -> Running after a successful baseline.
    pub(super) fn mark_running(&self, baseline: &OddsSnapshot) -> bool {
        let mut record = self.record.lock();
        if record.state != SessionState::Idle {
            return false;
        }
        record.state = SessionState::Running;
        record.stats.match_count = baseline.len();
        record.stats.last_success_at = Some(baseline.captured_at());
        true
    }

    /// Idle/Running -> Stopping. False if a stop is already underway.
    pub(super) fn begin_stop(&self, reason: StopReason) -> bool {
        let mut record = self.record.lock();
        match record.state {
            SessionState::Idle | SessionState::Running => {
                record.state = SessionState::Stopping;
                record.stop_reason = Some(reason);
                true
            }
            SessionState::Stopping | SessionState::Stopped => false,
        }
    }

    /// Any -> Stopped. Keeps the first recorded reason.
    pub(super) fn finish(&self, fallback: StopReason) {
        let mut record = self.record.lock();
        if record.state == SessionState::Stopped {
            return;
        }
        record.state = SessionState::Stopped;
        record.stopped_at = Some(Utc::now());
        if record.stop_reason.is_none() {
            record.stop_reason = Some(fallback);
        }
    }

    /// Running -> Stopped on the failure threshold. Loses to a pending stop.
    fn auto_stop(&self, reason: StopReason) -> bool {
        let mut record = self.record.lock();
        if record.state != SessionState::Running {
            return false;
        }
        record.state = SessionState::Stopped;
        record.stopped_at = Some(Utc::now());
        record.stop_reason = Some(reason);
        true
    }

    fn record_success(&self, snapshot: &OddsSnapshot) {
        self.record
            .lock()
            .stats
            .record_success(snapshot.len(), snapshot.captured_at());
    }

    fn record_failure(&self, error: &FetchError) -> u32 {
        self.record.lock().stats.record_failure(&error.to_string())
    }

    fn record_delivery(&self, delivered: Option<usize>) {
        let mut record = self.record.lock();
        match delivered {
            Some(n) => record.stats.changes_delivered += n as u64,
            None => record.stats.delivery_failures += 1,
        }
    }
}

/// The running poll loop. Owns its last snapshot exclusively.
pub(super) struct SessionTask {
    pub(super) shared: Arc<SessionShared>,
    pub(super) source: Arc<dyn OddsSource>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) differ: SnapshotDiffer,
    pub(super) delist: DelistFilter,
    pub(super) poll_interval: Duration,
    pub(super) failure_threshold: u32,
    pub(super) cancel: watch::Receiver<bool>,
}

impl SessionTask {
    pub(super) async fn run(mut self, baseline: OddsSnapshot) {
        let subscriber = self.shared.subscriber;
        let session_id = self.shared.session_id.clone();
        let mut last = baseline;

        info!(
            %subscriber,
            %session_id,
            matches = last.len(),
            interval_secs = self.poll_interval.as_secs(),
            "Monitor running"
        );

        loop {
            let woke = tokio::select! {
                biased;
                () = cancelled(&mut self.cancel) => false,
                () = tokio::time::sleep(self.poll_interval) => true,
            };
            if !woke {
                break;
            }

            let fetched = tokio::select! {
                biased;
                () = cancelled(&mut self.cancel) => None,
                result = self.source.fetch_current_odds() => Some(result),
            };
            let Some(fetched) = fetched else {
                break;
            };

            match fetched {
                Ok(snapshot) => {
                    let changes = self.differ.diff(Some(&last), &snapshot);
                    let changes = self.delist.apply(changes, snapshot.captured_at());
                    self.shared.record_success(&snapshot);
                    debug!(
                        %subscriber,
                        matches = snapshot.len(),
                        changes = changes.len(),
                        "Poll complete"
                    );
                    let captured_at = snapshot.captured_at();
                    last = snapshot;

                    if !changes.is_empty() {
                        self.deliver_changes(changes, captured_at).await;
                    }
                }
                Err(e) => {
                    let failures = self.shared.record_failure(&e);
                    warn!(
                        %subscriber,
                        error = %e,
                        kind = e.kind(),
                        failures,
                        threshold = self.failure_threshold,
                        "Poll failed, keeping previous snapshot"
                    );

                    if failures >= self.failure_threshold {
                        let reason = StopReason::TooManyFailures {
                            failures,
                            last_error: e.to_string(),
                        };
                        if self.shared.auto_stop(reason.clone()) {
                            error!(%subscriber, %session_id, failures, "Monitor auto-stopped");
                            self.notify(Notification::AutoStopped { reason }).await;
                        }
                        return;
                    }
                }
            }
        }

        self.shared.finish(StopReason::UserRequested);
        info!(%subscriber, %session_id, "Monitor stopped");
    }

    async fn deliver_changes(&self, changes: Vec<OddsChange>, captured_at: DateTime<Utc>) {
        let count = changes.len();
        let delivered = self
            .notify(Notification::Changes {
                changes,
                captured_at,
            })
            .await;
        self.shared.record_delivery(delivered.then_some(count));
    }

    async fn notify(&self, notification: Notification) -> bool {
        let subscriber = self.shared.subscriber;
        let kind = notification.kind();
        match self.notifier.deliver(subscriber, notification).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%subscriber, kind, error = %e, "Delivery failed, monitor continues");
                false
            }
        }
    }
}
