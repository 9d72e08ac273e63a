//! `check memory`: one sample against the configured limits.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::memory::ProcfsProbe;
use crate::application::health::build_health_report;
use crate::application::memory::{AdmissionGate, MemoryGuard};
use crate::domain::{HealthStatus, MemoryLevel};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::MemoryProbe;

pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let probe = Arc::new(ProcfsProbe::new());
    if let Err(e) = probe.resident_bytes() {
        output::error(&format!("Cannot sample memory: {e}"));
        return Err(e.into());
    }

    let gate = Arc::new(AdmissionGate::new());
    let guard = MemoryGuard::new(
        probe,
        config.memory.limits()?,
        Arc::clone(&gate),
        config.memory.check_interval(),
    );

    let state = guard.sample();
    let report = build_health_report(&state, &gate, false, false);

    if output::is_json() {
        output::json_output(json!({
            "command": "check.memory",
            "level": state.level(),
            "memory": state,
            "report": report,
        }));
    } else {
        output::section("Memory");
        output::field(
            "Resident",
            state
                .resident_mb()
                .map_or_else(|| "unknown".to_string(), |mb| format!("{mb:.1} MB")),
        );
        output::field("Soft limit", format!("{} MB", config.memory.soft_mb()));
        output::field("Hard limit", format!("{} MB", config.memory.hard_mb()));
        output::field("Level", state.level());
        for check in report.checks() {
            if let HealthStatus::Unhealthy(reason) = check.status() {
                output::warning(&format!("{}: {reason}", check.name()));
            }
        }
    }

    if state.level() == MemoryLevel::Critical {
        output::warning("At or above the hard limit, new monitors would be refused");
    } else if !output::is_json() {
        output::success("Memory sampled");
    }
    Ok(())
}
