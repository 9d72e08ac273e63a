//! Odds source port.

use async_trait::async_trait;

use crate::domain::OddsSnapshot;
use crate::error::FetchError;

/// Supplies the current full set of football 1X2 odds.
///
/// Every failure is retryable from the caller's point of view; sessions
/// count them towards their consecutive-failure threshold.
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Fetch a fresh snapshot.
    async fn fetch_current_odds(&self) -> Result<OddsSnapshot, FetchError>;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "odds-source"
    }
}
