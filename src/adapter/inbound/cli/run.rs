//! Handler for the `run` command.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::ConfigPathArg;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::orchestration::run_with_shutdown;

/// Load configuration, start logging and run until Ctrl-C.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    if !output::is_quiet() && !output::is_json() {
        print_startup(&config);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });

    run_with_shutdown(config, shutdown_rx).await
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Feed", &config.source.base_url);
    output::field("Poll interval", format!("{}s", config.monitor.poll_interval_secs));
    output::field("Max sessions", config.monitor.max_sessions);
    if config.memory.enabled {
        output::field(
            "Memory limits",
            format!("{} MB soft / {} MB hard", config.memory.soft_mb(), config.memory.hard_mb()),
        );
    } else {
        output::warning("Memory guard disabled");
    }
    if output::verbosity() > 0 {
        output::field("Tolerance", config.monitor.tolerance);
        output::field("Fail threshold", config.monitor.failure_threshold);
    }
    if !config.telegram.enabled {
        output::warning("Telegram disabled, monitors cannot be started");
    }
}
