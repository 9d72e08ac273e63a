//! Health report assembly.

use crate::domain::{HealthCheck, HealthReport, MemoryLevel, MemoryState};

use super::memory::AdmissionGate;

/// Build the process health report from the guard's last observation.
///
/// `guard_running` is only consulted when the guard is enabled.
#[must_use]
pub fn build_health_report(
    memory: &MemoryState,
    gate: &AdmissionGate,
    guard_enabled: bool,
    guard_running: bool,
) -> HealthReport {
    let level = memory.level();

    let memory_problem = (level == MemoryLevel::Critical).then(|| {
        format!(
            "resident {:.1} MB at or above hard limit {} MB",
            memory.resident_mb().unwrap_or_default(),
            memory.limits.hard_bytes() / (1024 * 1024)
        )
    });
    let sampling_problem =
        (level == MemoryLevel::Unknown).then(|| "memory sampling failed".to_string());
    let admission_problem = (!gate.is_open())
        .then(|| gate.reason().unwrap_or_else(|| "new monitors paused".to_string()));
    let guard_problem =
        (guard_enabled && !guard_running).then(|| "memory guard task is not running".to_string());

    HealthReport::new(vec![
        HealthCheck::from_problem("memory", true, memory_problem),
        HealthCheck::from_problem("memory_sampling", false, sampling_problem),
        HealthCheck::from_problem("admission", false, admission_problem),
        HealthCheck::from_problem("guard", true, guard_problem),
    ])
}
