//! Message formatting for Telegram notifications and command replies.
//!
//! Everything is plain text; league and team names come straight from the
//! feed and are never interpreted as markup.

use chrono::{DateTime, Utc};

use crate::domain::{
    ChangeKind, HealthReport, HealthStatus, Liveness, MemoryState, OddsChange, OddsSnapshot,
    SessionState, SessionSummary,
};
use crate::error::StartError;
use crate::port::inbound::StopOutcome;
use crate::port::outbound::Notification;

const NAME_WIDTH: usize = 60;

/// Render a session delivery.
pub fn format_notification(notification: &Notification, change_limit: usize) -> String {
    match notification {
        Notification::Changes {
            changes,
            captured_at,
        } => format_changes(changes, *captured_at, change_limit),
        Notification::AutoStopped { reason } => format!(
            "⚠️ Monitoring stopped automatically\n\n{reason}\n\nSend /monitor to try again."
        ),
    }
}

pub fn format_changes(changes: &[OddsChange], captured_at: DateTime<Utc>, limit: usize) -> String {
    let mut lines = vec![format!("🔄 Odds changes ({})", changes.len())];

    for change in changes.iter().take(limit) {
        lines.push(String::new());
        lines.push(format!("📈 {}", truncate(&change.league, NAME_WIDTH)));
        lines.push(format!("   {}", change.fixture()));
        lines.push(format!("   {}", describe_change(change)));
    }
    if changes.len() > limit {
        lines.push(String::new());
        lines.push(format!("... and {} more", changes.len() - limit));
    }

    lines.push(String::new());
    lines.push(format!("⏰ {}", captured_at.format("%H:%M:%S UTC")));
    lines.join("\n")
}

fn describe_change(change: &OddsChange) -> String {
    match (change.kind, change.previous, change.current) {
        (ChangeKind::Moved, Some(previous), Some(current)) => format!(
            "{previous} → {current} (max Δ {})",
            change.magnitude.normalize()
        ),
        (ChangeKind::Listed, _, Some(current)) => format!("🆕 listed at {current}"),
        (ChangeKind::Delisted, Some(previous), _) => format!("❌ delisted (was {previous})"),
        (kind, _, _) => kind.as_str().to_string(),
    }
}

pub fn format_snapshot(snapshot: &OddsSnapshot, limit: usize) -> String {
    let mut lines = vec![format!(
        "📊 Current football 1X2 odds ({} matches)",
        snapshot.len()
    )];

    for (i, odds) in snapshot.matches().iter().take(limit).enumerate() {
        lines.push(String::new());
        lines.push(format!("{}. {}", i + 1, truncate(&odds.league, NAME_WIDTH)));
        lines.push(format!("   {}", odds.fixture()));
        lines.push(format!(
            "   1: {} | X: {} | 2: {}",
            odds.prices.home, odds.prices.draw, odds.prices.away
        ));
    }
    if snapshot.len() > limit {
        lines.push(String::new());
        lines.push(format!("... and {} more matches", snapshot.len() - limit));
    }

    lines.push(String::new());
    lines.push(format!(
        "⏰ Updated {}",
        snapshot.captured_at().format("%H:%M:%S UTC")
    ));
    lines.join("\n")
}

pub fn format_started(summary: &SessionSummary) -> String {
    format!(
        "🚀 Monitoring started\n\n\
        Tracking {} matches, checking every {}s.\n\
        Send /stop to end it.",
        summary.stats.match_count,
        summary.poll_interval.as_secs()
    )
}

pub fn format_start_error(err: &StartError) -> String {
    match err {
        StartError::AlreadyRunning => {
            "⚠️ You are already monitoring. Send /stop first.".to_string()
        }
        StartError::Capacity(e) => format!("⏳ Cannot start right now: {e}. Try again later."),
        StartError::Baseline(e) => format!("❌ Could not start monitoring: {e}"),
        StartError::Cancelled => "⏹️ Monitoring was stopped before it started.".to_string(),
        StartError::ShuttingDown => "🔌 The service is shutting down.".to_string(),
    }
}

pub fn format_stopped(outcome: &StopOutcome) -> String {
    match outcome {
        StopOutcome::Stopped(summary) => format!(
            "⏹️ Monitoring stopped\n\n\
            Polls: {}\n\
            Changes delivered: {}",
            summary.stats.polls, summary.stats.changes_delivered
        ),
        StopOutcome::NotRunning => "ℹ️ You have no running monitor.".to_string(),
    }
}

/// `/status`: the caller's session plus process-wide figures.
pub fn format_status(own: Option<&SessionSummary>, active: usize, memory: &MemoryState) -> String {
    let mut lines = vec![
        "📊 Status".to_string(),
        String::new(),
        format!("🔄 Active monitors: {active}"),
        format!("💾 Memory: {} ({})", resident(memory), memory.level()),
        String::new(),
        "🔍 Your monitor".to_string(),
    ];

    match own {
        None => lines.push("Not started. Send /monitor.".to_string()),
        Some(summary) => {
            let stats = &summary.stats;
            let state = match summary.state {
                SessionState::Running => "🟢 running",
                SessionState::Idle => "🟡 starting",
                SessionState::Stopping => "🟠 stopping",
                SessionState::Stopped => "🔴 stopped",
            };
            lines.push(format!("State: {state}"));
            lines.push(format!("Matches tracked: {}", stats.match_count));
            lines.push(format!("Polls: {}", stats.polls));
            lines.push(format!(
                "Failures: {} in a row, {} total",
                stats.consecutive_failures, stats.total_failures
            ));
            lines.push(format!(
                "Changes delivered: {} ({} failed deliveries)",
                stats.changes_delivered, stats.delivery_failures
            ));
            if let Some(at) = stats.last_success_at {
                lines.push(format!("Last update: {}", at.format("%H:%M:%S UTC")));
            }
            if let Some(reason) = &summary.stop_reason {
                lines.push(format!("Reason: {reason}"));
            }
        }
    }
    lines.join("\n")
}

pub fn format_memory(state: &MemoryState) -> String {
    let mb = |bytes: u64| bytes / (1024 * 1024);
    let usage = state
        .usage_ratio()
        .map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0));
    let cleanup = state
        .last_cleanup_at
        .map_or_else(|| "never".to_string(), |at| at.format("%H:%M:%S UTC").to_string());

    format!(
        "💾 Memory\n\n\
        Resident: {}\n\
        Level: {}\n\
        Of hard limit: {}\n\
        Limits: soft {} MB, hard {} MB\n\
        New monitors: {}\n\
        Last cleanup: {}",
        resident(state),
        state.level(),
        usage,
        mb(state.limits.soft_bytes()),
        mb(state.limits.hard_bytes()),
        if state.shedding { "paused" } else { "accepted" },
        cleanup
    )
}

pub fn format_health(report: &HealthReport, liveness: &Liveness) -> String {
    let (emoji, status) = if report.is_healthy() {
        ("✅", "HEALTHY")
    } else {
        ("⚠️", "DEGRADED")
    };

    let mut lines = vec![
        format!("{emoji} {status}"),
        String::new(),
        format!("⏱️ Uptime: {}", format_uptime(liveness.uptime_secs)),
        format!("🔄 Active monitors: {}", liveness.active_sessions),
        String::new(),
    ];
    for check in report.checks() {
        let marker = if check.critical() { "" } else { " (non-critical)" };
        match check.status() {
            HealthStatus::Healthy => lines.push(format!("✅ {}{marker}", check.name())),
            HealthStatus::Unhealthy(reason) => {
                lines.push(format!("❌ {}{marker}: {reason}", check.name()));
            }
        }
    }
    lines.join("\n")
}

pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {}s", secs % 60)
    }
}

fn resident(state: &MemoryState) -> String {
    state
        .resident_mb()
        .map_or_else(|| "unknown".to_string(), |mb| format!("{mb:.1} MB"))
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Split text into chunks of at most `max_chars` characters, breaking on
/// line boundaries. A single line longer than the limit is cut hard.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for mut line in text.lines() {
        loop {
            let line_len = line.chars().count();
            let needed = if current.is_empty() {
                line_len
            } else {
                current_len + 1 + line_len
            };

            if needed <= max_chars {
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line);
                current_len = needed;
                break;
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }

            let cut = line
                .char_indices()
                .nth(max_chars)
                .map_or(line.len(), |(i, _)| i);
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
            if line.is_empty() {
                break;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
