//! Health reporting types.

use std::time::Duration;

use serde::Serialize;

use super::memory::MemoryLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    pub fn new(name: &'static str, critical: bool, status: HealthStatus) -> Self {
        Self {
            name,
            critical,
            status,
        }
    }

    /// Healthy unless `problem` is set.
    pub fn from_problem(name: &'static str, critical: bool, problem: Option<String>) -> Self {
        let status = problem.map_or(HealthStatus::Healthy, HealthStatus::Unhealthy);
        Self::new(name, critical, status)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Non-critical failures degrade the report without failing it.
    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy)
    }
}

/// Liveness probe payload consumed by the hosting platform.
#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub healthy: bool,
    pub active_sessions: usize,
    pub memory_level: MemoryLevel,
    pub uptime_secs: u64,
}

impl Liveness {
    pub fn new(report: &HealthReport, active_sessions: usize, memory_level: MemoryLevel, uptime: Duration) -> Self {
        Self {
            healthy: report.is_healthy(),
            active_sessions,
            memory_level,
            uptime_secs: uptime.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_healthy_when_only_non_critical_fails() {
        let report = HealthReport::new(vec![
            HealthCheck::new("memory", true, HealthStatus::Healthy),
            HealthCheck::from_problem("admission", false, Some("shedding".into())),
        ]);

        assert!(report.is_healthy());
        assert!(!report.check("admission").unwrap().is_healthy());
    }

    #[test]
    fn report_is_unhealthy_when_critical_fails() {
        let report = HealthReport::new(vec![
            HealthCheck::from_problem("memory", true, Some("critical".into())),
            HealthCheck::new("guard", true, HealthStatus::Healthy),
        ]);

        assert!(!report.is_healthy());
    }

    #[test]
    fn liveness_mirrors_report() {
        let report = HealthReport::new(vec![HealthCheck::new("guard", true, HealthStatus::Healthy)]);
        let live = Liveness::new(&report, 3, MemoryLevel::Normal, Duration::from_secs(90));

        assert!(live.healthy);
        assert_eq!(live.active_sessions, 3);
        assert_eq!(live.uptime_secs, 90);
    }
}
