//! Service runtime lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::Result;
use crate::infrastructure::bootstrap::build_runtime;
use crate::infrastructure::config::Config;
#[cfg(feature = "telegram")]
use crate::port::inbound::MonitorControl;

/// Run the service until `shutdown` flips to true (or its sender drops),
/// then stop every monitor session.
pub async fn run_with_shutdown(config: Config, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        source = %config.source.base_url,
        memory_guard = config.memory.enabled,
        telegram = config.telegram.enabled,
        "Starting oddswatch"
    );

    let runtime = build_runtime(&config)?;

    let guard_task = if config.memory.enabled {
        let state = runtime.guard.sample();
        info!(
            resident_mb = state.resident_mb().unwrap_or_default(),
            level = %state.level(),
            "Memory guard enabled"
        );
        Some(Arc::clone(&runtime.guard).spawn(shutdown.clone()))
    } else {
        None
    };

    #[cfg(feature = "telegram")]
    let listener = runtime
        .telegram
        .as_ref()
        .map(|telegram| telegram.spawn_command_listener(Arc::clone(&runtime.service) as Arc<dyn MonitorControl>));
    #[cfg(feature = "telegram")]
    let has_surface = listener.is_some();
    #[cfg(not(feature = "telegram"))]
    let has_surface = false;

    if !has_surface {
        warn!("No command surface enabled, nothing can start monitors");
    }

    wait_for_shutdown(&mut shutdown).await;
    info!(
        active = runtime.registry.active_count(),
        "Shutdown requested, stopping monitors"
    );

    #[cfg(feature = "telegram")]
    {
        if let Some(listener) = listener {
            listener.abort();
        }
    }
    runtime.registry.shutdown_all().await;

    if let Some(task) = guard_task {
        if let Err(e) = task.await {
            warn!(error = %e, "Memory guard task ended abnormally");
        }
    }

    info!("oddswatch stopped");
    Ok(())
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn returns_once_shutdown_is_signalled() {
        let config = Config::parse_toml_with_env(
            "[telegram]\nenabled = false\n[memory]\nenabled = false\n",
            |_| None,
        )
        .unwrap();
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_with_shutdown(config, rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runtime should stop")
            .expect("runtime task should not panic");
        assert!(result.is_ok());
    }
}
