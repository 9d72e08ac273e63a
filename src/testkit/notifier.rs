//! Recording [`Notifier`] for delivery assertions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{OddsChange, StopReason, SubscriberId};
use crate::error::DeliveryError;
use crate::port::outbound::{Notification, Notifier};

/// Thread-safe delivery collector. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<(SubscriberId, Notification)>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every delivery (still recorded as attempted).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.deliveries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn deliveries(&self) -> Vec<(SubscriberId, Notification)> {
        self.deliveries.lock().clone()
    }

    /// All change batches delivered to `subscriber`, in order.
    pub fn change_batches(&self, subscriber: SubscriberId) -> Vec<Vec<OddsChange>> {
        self.deliveries
            .lock()
            .iter()
            .filter(|(s, _)| *s == subscriber)
            .filter_map(|(_, n)| match n {
                Notification::Changes { changes, .. } => Some(changes.clone()),
                Notification::AutoStopped { .. } => None,
            })
            .collect()
    }

    pub fn auto_stops(&self, subscriber: SubscriberId) -> Vec<StopReason> {
        self.deliveries
            .lock()
            .iter()
            .filter(|(s, _)| *s == subscriber)
            .filter_map(|(_, n)| match n {
                Notification::AutoStopped { reason } => Some(reason.clone()),
                Notification::Changes { .. } => None,
            })
            .collect()
    }

    /// Poll until at least `count` deliveries were attempted.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.len() >= count
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(
        &self,
        subscriber: SubscriberId,
        notification: Notification,
    ) -> Result<(), DeliveryError> {
        self.deliveries.lock().push((subscriber, notification));
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Unreachable {
                subscriber: subscriber.get(),
                reason: "recording notifier set to fail".into(),
            });
        }
        Ok(())
    }
}
