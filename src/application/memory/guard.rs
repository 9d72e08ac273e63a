//! Memory guard.
//!
//! Samples resident memory on a fixed interval, runs reclamation passes
//! when usage crosses the soft limit, and closes the admission gate while
//! usage stays at or above the hard limit (or cannot be read at all).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{MemoryLevel, MemoryLimits, MemoryState};
use crate::port::outbound::{MemoryProbe, Reclaim};

use super::gate::AdmissionGate;

pub struct MemoryGuard {
    probe: Arc<dyn MemoryProbe>,
    state: RwLock<MemoryState>,
    gate: Arc<AdmissionGate>,
    reclaimers: RwLock<Vec<Arc<dyn Reclaim>>>,
    check_interval: Duration,
    running: AtomicBool,
}

impl MemoryGuard {
    pub fn new(
        probe: Arc<dyn MemoryProbe>,
        limits: MemoryLimits,
        gate: Arc<AdmissionGate>,
        check_interval: Duration,
    ) -> Self {
        Self {
            probe,
            state: RwLock::new(MemoryState::new(limits)),
            gate,
            reclaimers: RwLock::new(Vec::new()),
            check_interval,
            running: AtomicBool::new(false),
        }
    }

    /// Add a reclaimer. Reclaimers run in registration order.
    pub fn register(&self, reclaimer: Arc<dyn Reclaim>) {
        self.reclaimers.write().push(reclaimer);
    }

    pub fn gate(&self) -> Arc<AdmissionGate> {
        Arc::clone(&self.gate)
    }

    /// Last known state without sampling.
    pub fn state(&self) -> MemoryState {
        self.state.read().clone()
    }

    /// Whether the periodic task is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Read current usage, update the shared state and admission.
    pub fn sample(&self) -> MemoryState {
        self.observe();
        self.admit()
    }

    /// Periodic check: reclaim above the soft limit, shed at the hard limit.
    pub fn maybe_cleanup(&self) -> MemoryState {
        let state = self.observe();
        if matches!(state.level(), MemoryLevel::High | MemoryLevel::Critical) {
            info!(
                resident_mb = state.resident_mb().unwrap_or_default(),
                level = %state.level(),
                "Memory above soft limit, reclaiming"
            );
            self.reclaim_pass();
            self.observe();
        }
        self.admit()
    }

    /// Unconditional reclamation pass followed by a fresh sample.
    pub fn cleanup_now(&self) -> MemoryState {
        self.reclaim_pass();
        self.sample()
    }

    /// Reclamation pass and fresh sample that leave admission untouched.
    pub fn reclaim_only(&self) -> MemoryState {
        self.reclaim_pass();
        self.observe()
    }

    /// Spawn the periodic check task. Exits when `shutdown` flips to true.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let guard = self;
        guard.running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(guard.check_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            debug!(
                interval_secs = guard.check_interval.as_secs(),
                "Memory guard started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        guard.maybe_cleanup();
                    }
                    result = shutdown.changed() => {
                        if result.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            guard.running.store(false, Ordering::SeqCst);
            debug!("Memory guard stopped");
        })
    }

    fn observe(&self) -> MemoryState {
        let reading = self.probe.resident_bytes();
        let mut state = self.state.write();
        state.sampled_at = Some(Utc::now());
        match reading {
            Ok(bytes) => state.resident_bytes = Some(bytes),
            Err(e) => {
                warn!(error = %e, "Memory sample failed, assuming pressure");
                state.resident_bytes = None;
            }
        }
        state.clone()
    }

    fn admit(&self) -> MemoryState {
        let mut state = self.state.write();
        match state.level() {
            MemoryLevel::Critical => {
                let reason = format!(
                    "resident {:.0} MB at or above hard limit",
                    state.resident_mb().unwrap_or_default()
                );
                if self.gate.close(reason) {
                    warn!(level = %state.level(), "Refusing new monitors");
                }
            }
            MemoryLevel::Unknown => {
                if self.gate.close("memory usage unknown") {
                    warn!("Refusing new monitors until memory can be sampled");
                }
            }
            MemoryLevel::Normal => {
                if self.gate.open() {
                    info!("Memory back under soft limit, accepting new monitors");
                }
            }
            // Between the limits the gate keeps its previous position.
            MemoryLevel::High => {}
        }
        state.shedding = !self.gate.is_open();
        state.clone()
    }

    fn reclaim_pass(&self) {
        let reclaimers = self.reclaimers.read().clone();
        let mut released = 0;
        for reclaimer in &reclaimers {
            let n = reclaimer.reclaim();
            debug!(reclaimer = reclaimer.name(), released = n, "Reclaimer ran");
            released += n;
        }
        self.state.write().last_cleanup_at = Some(Utc::now());
        info!(released, reclaimers = reclaimers.len(), "Cleanup pass complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoryProbeError;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    const MB: u64 = 1024 * 1024;

    struct Scripted(Mutex<Vec<Result<u64, MemoryProbeError>>>);

    impl MemoryProbe for Scripted {
        fn resident_bytes(&self) -> Result<u64, MemoryProbeError> {
            let mut readings = self.0.lock();
            if readings.len() > 1 {
                readings.remove(0)
            } else {
                readings[0].clone()
            }
        }
    }

    struct Counting(AtomicUsize);

    impl Reclaim for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn reclaim(&self) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst);
            2
        }
    }

    fn guard(readings: Vec<Result<u64, MemoryProbeError>>) -> (MemoryGuard, Arc<Counting>) {
        let probe = Arc::new(Scripted(Mutex::new(readings)));
        let limits = MemoryLimits::from_mb(100, 200).unwrap();
        let guard = MemoryGuard::new(
            probe,
            limits,
            Arc::new(AdmissionGate::new()),
            Duration::from_secs(60),
        );
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        guard.register(counting.clone());
        (guard, counting)
    }

    #[test]
    fn below_soft_limit_does_nothing() {
        let (guard, counting) = guard(vec![Ok(50 * MB)]);
        let state = guard.maybe_cleanup();

        assert_eq!(state.level(), MemoryLevel::Normal);
        assert!(state.last_cleanup_at.is_none());
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);
        assert!(guard.gate().is_open());
    }

    #[test]
    fn above_soft_limit_reclaims_but_keeps_admitting() {
        let (guard, counting) = guard(vec![Ok(150 * MB), Ok(120 * MB)]);
        let state = guard.maybe_cleanup();

        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
        assert!(state.last_cleanup_at.is_some());
        assert!(!state.shedding);
    }

    #[test]
    fn hard_limit_after_cleanup_closes_gate_until_under_soft() {
        let (guard, _) = guard(vec![Ok(250 * MB), Ok(240 * MB), Ok(150 * MB), Ok(80 * MB)]);

        assert!(guard.maybe_cleanup().shedding);
        // between the limits the gate stays closed
        assert!(guard.sample().shedding);
        assert!(!guard.sample().shedding);
        assert!(guard.gate().is_open());
    }

    #[test]
    fn failed_sample_sheds_conservatively() {
        let (guard, _) = guard(vec![Err(MemoryProbeError::Unsupported)]);
        let state = guard.sample();

        assert_eq!(state.level(), MemoryLevel::Unknown);
        assert!(state.shedding);
        assert!(guard.gate().check().is_err());
    }

    #[test]
    fn cleanup_now_always_reclaims() {
        let (guard, counting) = guard(vec![Ok(10 * MB)]);
        let state = guard.cleanup_now();

        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
        assert!(state.last_cleanup_at.is_some());
    }

    #[test]
    fn reclaim_only_never_closes_gate() {
        let (guard, counting) = guard(vec![Err(MemoryProbeError::Unsupported)]);
        let state = guard.reclaim_only();

        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
        assert_eq!(state.level(), MemoryLevel::Unknown);
        assert!(!state.shedding);
        assert!(guard.gate().is_open());
    }

    #[tokio::test]
    async fn periodic_task_stops_on_shutdown() {
        let (guard, _) = guard(vec![Ok(10 * MB)]);
        let guard = Arc::new(guard);
        let (tx, rx) = watch::channel(false);

        let handle = Arc::clone(&guard).spawn(rx);
        assert!(guard.is_running());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!guard.is_running());
    }
}
