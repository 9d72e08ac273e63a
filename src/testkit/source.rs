//! Scripted [`OddsSource`] for driving sessions deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::OddsSnapshot;
use crate::error::FetchError;
use crate::port::outbound::OddsSource;

/// Replays queued fetch results.
///
/// Each fetch pops the next result; once the queue is empty the fallback
/// is returned forever. Every fetch waits `delay` first, which lets tests
/// catch a session mid-fetch.
pub struct ScriptedSource {
    queue: Mutex<VecDeque<Result<OddsSnapshot, FetchError>>>,
    fallback: Mutex<Result<OddsSnapshot, FetchError>>,
    delay: Mutex<Duration>,
    fetches: Arc<AtomicU32>,
}

impl ScriptedSource {
    /// Always returns `snapshot`.
    pub fn steady(snapshot: OddsSnapshot) -> Self {
        Self::with_fallback(Ok(snapshot))
    }

    /// Always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self::with_fallback(Err(error))
    }

    pub fn with_fallback(fallback: Result<OddsSnapshot, FetchError>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            delay: Mutex::new(Duration::ZERO),
            fetches: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queue results served before the fallback.
    pub fn then(self, results: Vec<Result<OddsSnapshot, FetchError>>) -> Self {
        self.queue.lock().extend(results);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = delay;
        self
    }

    pub fn push(&self, result: Result<OddsSnapshot, FetchError>) {
        self.queue.lock().push_back(result);
    }

    pub fn set_fallback(&self, fallback: Result<OddsSnapshot, FetchError>) {
        *self.fallback.lock() = fallback;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OddsSource for ScriptedSource {
    async fn fetch_current_odds(&self) -> Result<OddsSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let next = self.queue.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.lock().clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
