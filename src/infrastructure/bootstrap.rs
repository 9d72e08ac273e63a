//! Composition root: builds the service graph from configuration.

use std::sync::Arc;

use tracing::info;
#[cfg(not(feature = "telegram"))]
use tracing::warn;

use crate::adapter::outbound::memory::{AllocatorTrim, ProcfsProbe};
#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{TelegramConfig, TelegramNotifier};
use crate::adapter::outbound::sportsbook::SportsbookClient;
use crate::application::memory::{AdmissionGate, MemoryGuard};
use crate::application::monitor::MonitorRegistry;
use crate::application::MonitorService;
#[cfg(feature = "telegram")]
use crate::error::ConfigError;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::{LogNotifier, Notifier, Reclaim};

/// Everything `run` needs to drive and tear down the service.
pub struct Runtime {
    pub service: Arc<MonitorService>,
    pub registry: Arc<MonitorRegistry>,
    pub guard: Arc<MemoryGuard>,
    #[cfg(feature = "telegram")]
    pub telegram: Option<Arc<TelegramNotifier>>,
}

/// Wire source, notifier, registry and memory guard.
///
/// Reclaimers run in registration order: the registry prunes expired
/// sessions, the sportsbook client drops its cached snapshot, and the
/// allocator trim returns what they freed.
#[allow(clippy::result_large_err)]
pub fn build_runtime(config: &Config) -> Result<Runtime> {
    let limits = config.memory.limits()?;
    let gate = Arc::new(AdmissionGate::new());
    let guard = Arc::new(MemoryGuard::new(
        Arc::new(ProcfsProbe::new()),
        limits,
        Arc::clone(&gate),
        config.memory.check_interval(),
    ));

    let source = Arc::new(SportsbookClient::from_config(config.source.clone()));

    #[cfg(feature = "telegram")]
    let telegram = build_telegram(config)?;
    #[cfg(feature = "telegram")]
    let notifier: Arc<dyn Notifier> = match &telegram {
        Some(telegram) => Arc::clone(telegram) as Arc<dyn Notifier>,
        None => Arc::new(LogNotifier),
    };
    #[cfg(not(feature = "telegram"))]
    let notifier: Arc<dyn Notifier> = {
        if config.telegram.enabled {
            warn!("Telegram enabled in config but the binary was built without the telegram feature");
        }
        Arc::new(LogNotifier)
    };

    let registry = Arc::new(MonitorRegistry::new(
        config.monitor.settings(),
        Arc::clone(&source) as _,
        notifier,
        gate,
    ));

    guard.register(Arc::clone(&registry) as Arc<dyn Reclaim>);
    guard.register(Arc::clone(&source) as Arc<dyn Reclaim>);
    guard.register(Arc::new(AllocatorTrim));

    let service = Arc::new(MonitorService::new(
        Arc::clone(&registry),
        Arc::clone(&guard),
        source,
        config.memory.enabled,
    ));

    info!(
        max_sessions = config.monitor.max_sessions,
        poll_interval_secs = config.monitor.poll_interval_secs,
        soft_limit_mb = config.memory.soft_mb(),
        hard_limit_mb = config.memory.hard_mb(),
        "Runtime wired"
    );

    Ok(Runtime {
        service,
        registry,
        guard,
        #[cfg(feature = "telegram")]
        telegram,
    })
}

#[cfg(feature = "telegram")]
#[allow(clippy::result_large_err)]
fn build_telegram(config: &Config) -> Result<Option<Arc<TelegramNotifier>>> {
    let app = &config.telegram;
    if !app.enabled {
        info!("Telegram disabled, changes are only logged");
        return Ok(None);
    }
    let token = app.bot_token.clone().ok_or(ConfigError::MissingField {
        field: "TELEGRAM_BOT_TOKEN",
    })?;

    let tg_config = TelegramConfig {
        allowed_user_ids: app.allowed_user_ids.clone(),
        admin_user_ids: app.admin_user_ids.clone(),
        odds_display_limit: app.odds_display_limit,
        change_display_limit: app.change_display_limit,
        message_chunk_len: app.message_chunk_len,
        ..TelegramConfig::new(token)
    };
    info!(
        allowed = tg_config.allowed_user_ids.len(),
        admins = tg_config.admin_user_ids.len(),
        "Telegram notifier enabled"
    );
    Ok(Some(Arc::new(TelegramNotifier::new(tg_config))))
}
