//! Notifier port for subscriber-facing deliveries.
//!
//! Sessions hand every non-empty diff and every auto-stop notice to a
//! [`Notifier`]. Delivery failures are reported back to the session, which
//! logs and counts them but keeps polling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{OddsChange, StopReason, SubscriberId};
use crate::error::DeliveryError;

/// Payloads a session can deliver.
#[derive(Debug, Clone)]
pub enum Notification {
    /// One poll cycle's worth of changes, in differ order.
    Changes {
        changes: Vec<OddsChange>,
        captured_at: DateTime<Utc>,
    },
    /// The session stopped without being asked to.
    AutoStopped { reason: StopReason },
}

impl Notification {
    /// Stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Changes { .. } => "changes",
            Self::AutoStopped { .. } => "auto_stopped",
        }
    }
}

/// Delivers payloads to subscribers.
///
/// Implementations must be thread-safe; one notifier is shared by every
/// session.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(
        &self,
        subscriber: SubscriberId,
        notification: Notification,
    ) -> Result<(), DeliveryError>;
}

/// A no-op notifier for when delivery is disabled.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn deliver(&self, _: SubscriberId, _: Notification) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// A notifier that only logs via tracing.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(
        &self,
        subscriber: SubscriberId,
        notification: Notification,
    ) -> Result<(), DeliveryError> {
        use tracing::info;
        match notification {
            Notification::Changes {
                changes,
                captured_at,
            } => {
                for change in &changes {
                    info!(
                        %subscriber,
                        key = %change.key,
                        kind = change.kind.as_str(),
                        magnitude = %change.magnitude,
                        "Odds change"
                    );
                }
                info!(%subscriber, changes = changes.len(), %captured_at, "Changes delivered");
            }
            Notification::AutoStopped { reason } => {
                info!(%subscriber, %reason, "Monitor auto-stopped");
            }
        }
        Ok(())
    }
}
