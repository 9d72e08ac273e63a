//! Monitor registry: the single source of truth for who is monitoring.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::memory::AdmissionGate;
use crate::domain::{DelistFilter, SessionSummary, SnapshotDiffer, StopReason, SubscriberId};
use crate::error::{CapacityError, StartError};
use crate::port::inbound::StopOutcome;
use crate::port::outbound::{Notifier, OddsSource, Reclaim};

use super::session::{cancelled, SessionShared, SessionTask};
use super::MonitorSettings;

struct Entry {
    shared: Arc<SessionShared>,
    cancel: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Entry {
    fn occupies_slot(&self) -> bool {
        self.shared.state().occupies_slot()
    }
}

/// Creates, limits and tears down monitor sessions.
///
/// Start and stop decisions are serialized on the session table. The
/// baseline fetch and every poll run outside the lock.
pub struct MonitorRegistry {
    settings: MonitorSettings,
    source: Arc<dyn OddsSource>,
    notifier: Arc<dyn Notifier>,
    gate: Arc<AdmissionGate>,
    sessions: Mutex<HashMap<SubscriberId, Entry>>,
    closed: AtomicBool,
}

impl MonitorRegistry {
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn OddsSource>,
        notifier: Arc<dyn Notifier>,
        gate: Arc<AdmissionGate>,
    ) -> Self {
        Self {
            settings,
            source,
            notifier,
            gate,
            sessions: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Admit a session, take its baseline, and spawn its poll loop.
    ///
    /// Rejections leave existing sessions untouched. A baseline failure
    /// removes the reservation; the session never runs.
    pub async fn start(&self, subscriber: SubscriberId) -> Result<SessionSummary, StartError> {
        let (shared, mut cancel) = self.reserve(subscriber)?;
        debug!(%subscriber, session_id = %shared.session_id, "Taking baseline");

        let baseline = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => None,
            result = self.source.fetch_current_odds() => Some(result),
        };

        let baseline = match baseline {
            None => {
                shared.finish(StopReason::UserRequested);
                info!(%subscriber, "Monitor stopped during baseline");
                return Err(StartError::Cancelled);
            }
            Some(Err(e)) => {
                self.release(&shared);
                warn!(%subscriber, error = %e, "Baseline failed, monitor not started");
                return Err(StartError::Baseline(e));
            }
            Some(Ok(snapshot)) => snapshot,
        };

        if *cancel.borrow() || !shared.mark_running(&baseline) {
            shared.finish(StopReason::UserRequested);
            return Err(StartError::Cancelled);
        }

        let window = chrono::Duration::from_std(self.settings.delist_flap_window)
            .unwrap_or_else(|_| chrono::Duration::zero());
        let task = SessionTask {
            shared: Arc::clone(&shared),
            source: Arc::clone(&self.source),
            notifier: Arc::clone(&self.notifier),
            differ: SnapshotDiffer::new(self.settings.tolerance),
            delist: DelistFilter::new(window),
            poll_interval: self.settings.poll_interval,
            failure_threshold: self.settings.failure_threshold,
            cancel,
        };
        let handle = tokio::spawn(task.run(baseline));

        {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(&subscriber) {
                Some(entry) if Arc::ptr_eq(&entry.shared, &shared) => entry.handle = Some(handle),
                // The entry was replaced while the baseline ran. The task
                // already saw its cancel signal.
                _ => handle.abort(),
            }
        }

        Ok(shared.summary())
    }

    /// Signal a session and wait for it to exit.
    pub async fn stop(&self, subscriber: SubscriberId) -> StopOutcome {
        let (shared, handle) = {
            let mut sessions = self.sessions.lock();
            let Some(entry) = sessions.get_mut(&subscriber) else {
                return StopOutcome::NotRunning;
            };
            if !entry.shared.begin_stop(StopReason::UserRequested) {
                return StopOutcome::NotRunning;
            }
            let _ = entry.cancel.send(true);
            (Arc::clone(&entry.shared), entry.handle.take())
        };

        if let Some(mut handle) = handle {
            if tokio::time::timeout(self.settings.stop_timeout, &mut handle)
                .await
                .is_err()
            {
                warn!(%subscriber, "Monitor did not stop in time, aborting");
                handle.abort();
            }
        }
        shared.finish(StopReason::UserRequested);

        info!(%subscriber, session_id = %shared.session_id, "Monitor stop requested");
        StopOutcome::Stopped(shared.summary())
    }

    pub fn status(&self, subscriber: SubscriberId) -> Option<SessionSummary> {
        self.sessions
            .lock()
            .get(&subscriber)
            .map(|entry| entry.shared.summary())
    }

    /// Subscribers holding a slot, in ascending id order.
    pub fn list_active(&self) -> Vec<SubscriberId> {
        let mut active: Vec<_> = self
            .sessions
            .lock()
            .iter()
            .filter(|(_, entry)| entry.occupies_slot())
            .map(|(subscriber, _)| *subscriber)
            .collect();
        active.sort_unstable();
        active
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .values()
            .filter(|entry| entry.occupies_slot())
            .count()
    }

    /// Stop every session and wait, bounded by the shutdown timeout.
    ///
    /// Later `start()` calls are refused with [`StartError::ShuttingDown`].
    pub async fn shutdown_all(&self) {
        let pending: Vec<(Arc<SessionShared>, Option<JoinHandle<()>>)> = {
            let mut sessions = self.sessions.lock();
            self.closed.store(true, Ordering::SeqCst);
            sessions
                .values_mut()
                .filter(|entry| entry.shared.begin_stop(StopReason::Shutdown))
                .map(|entry| {
                    let _ = entry.cancel.send(true);
                    (Arc::clone(&entry.shared), entry.handle.take())
                })
                .collect()
        };

        if pending.is_empty() {
            return;
        }
        info!(sessions = pending.len(), "Stopping all monitors");

        let (shared, handles): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        let handles: Vec<JoinHandle<()>> = handles.into_iter().flatten().collect();
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        if tokio::time::timeout(self.settings.shutdown_timeout, join_all(handles))
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.settings.shutdown_timeout.as_secs(),
                "Monitors did not stop in time, aborting"
            );
            for abort in aborts {
                abort.abort();
            }
        }

        for session in &shared {
            session.finish(StopReason::Shutdown);
        }
        info!(sessions = shared.len(), "All monitors stopped");
    }

    /// Drop stopped entries older than the retention window.
    pub fn prune_stopped(&self) -> usize {
        let Ok(retention) = chrono::Duration::from_std(self.settings.stopped_retention) else {
            return 0;
        };
        let cutoff = Utc::now() - retention;

        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.shared.stopped_at() {
            Some(at) => at > cutoff,
            None => true,
        });
        before - sessions.len()
    }

    /// Reserve a slot under the lock. Checks run in a fixed order:
    /// shutdown, duplicate subscriber, global cap, memory admission.
    fn reserve(
        &self,
        subscriber: SubscriberId,
    ) -> Result<(Arc<SessionShared>, watch::Receiver<bool>), StartError> {
        let mut sessions = self.sessions.lock();

        if self.closed.load(Ordering::SeqCst) {
            return Err(StartError::ShuttingDown);
        }
        if sessions.get(&subscriber).is_some_and(Entry::occupies_slot) {
            return Err(StartError::AlreadyRunning);
        }

        let active = sessions.values().filter(|e| e.occupies_slot()).count();
        if active >= self.settings.max_sessions {
            return Err(CapacityError::GlobalLimit {
                active,
                limit: self.settings.max_sessions,
            }
            .into());
        }

        self.gate.check()?;

        let shared = Arc::new(SessionShared::new(subscriber, self.settings.poll_interval));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        sessions.insert(
            subscriber,
            Entry {
                shared: Arc::clone(&shared),
                cancel: cancel_tx,
                handle: None,
            },
        );
        Ok((shared, cancel_rx))
    }

    fn release(&self, shared: &Arc<SessionShared>) {
        let mut sessions = self.sessions.lock();
        if sessions
            .get(&shared.subscriber)
            .is_some_and(|entry| Arc::ptr_eq(&entry.shared, shared))
        {
            sessions.remove(&shared.subscriber);
        }
    }
}

impl Reclaim for MonitorRegistry {
    fn name(&self) -> &'static str {
        "monitor-registry"
    }

    fn reclaim(&self) -> usize {
        self.prune_stopped()
    }
}
