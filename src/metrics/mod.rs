use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters describing what panels have been doing.
#[derive(Debug, Default, Clone)]
pub struct PanelMetrics {
    gestures: u64,
    vetoes: u64,
    actions: u64,
    action_failures: u64,
    repopulations: u64,
    skipped_refreshes: u64,
    commits: u64,
    unchanged_commits: u64,
    overlays_expired: u64,
}

impl PanelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_gesture(&mut self, vetoed: bool) {
        self.gestures = self.gestures.saturating_add(1);
        if vetoed {
            self.vetoes = self.vetoes.saturating_add(1);
        }
    }

    pub fn record_action(&mut self, failed: bool) {
        self.actions = self.actions.saturating_add(1);
        if failed {
            self.action_failures = self.action_failures.saturating_add(1);
        }
    }

    pub fn record_repopulation(&mut self, skipped: bool) {
        if skipped {
            self.skipped_refreshes = self.skipped_refreshes.saturating_add(1);
        } else {
            self.repopulations = self.repopulations.saturating_add(1);
        }
    }

    pub fn record_commit(&mut self, changed: bool) {
        self.commits = self.commits.saturating_add(1);
        if !changed {
            self.unchanged_commits = self.unchanged_commits.saturating_add(1);
        }
    }

    pub fn record_overlays_expired(&mut self, count: usize) {
        self.overlays_expired = self.overlays_expired.saturating_add(count as u64);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            gestures: self.gestures,
            vetoes: self.vetoes,
            actions: self.actions,
            action_failures: self.action_failures,
            repopulations: self.repopulations,
            skipped_refreshes: self.skipped_refreshes,
            commits: self.commits,
            unchanged_commits: self.unchanged_commits,
            overlays_expired: self.overlays_expired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub gestures: u64,
    pub vetoes: u64,
    pub actions: u64,
    pub action_failures: u64,
    pub repopulations: u64,
    pub skipped_refreshes: u64,
    pub commits: u64,
    pub unchanged_commits: u64,
    pub overlays_expired: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "panel_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("gestures".to_string(), json!(self.gestures));
        map.insert("vetoes".to_string(), json!(self.vetoes));
        map.insert("actions".to_string(), json!(self.actions));
        map.insert("action_failures".to_string(), json!(self.action_failures));
        map.insert("repopulations".to_string(), json!(self.repopulations));
        map.insert("skipped_refreshes".to_string(), json!(self.skipped_refreshes));
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("unchanged_commits".to_string(), json!(self.unchanged_commits));
        map.insert("overlays_expired".to_string(), json!(self.overlays_expired));
        map
    }
}
