//! Panel lifecycle audit hooks.
//!
//! Records capture a stage plus structured details so callers can log,
//! buffer or assert on a panel's progression without touching its core
//! logic.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Lifecycle checkpoints emitted by a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAuditStage {
    /// Widget and buffer allocated, listener subscribed.
    Constructed,
    /// `open` was called for a viewer.
    Opening,
    /// First populate and commit finished.
    Populated,
    /// The widget is displayed to the viewer.
    Activated,
    /// A refresh pass started.
    RefreshStarted,
    /// A refresh pass was skipped because the bound viewer is offline.
    RefreshSkipped,
    /// The shadow buffer was copied to the widget.
    Committed,
    /// A viewer left while others still have the widget open.
    ViewerDeparted,
    /// Last viewer closed the widget; listeners released.
    TornDown,
}

#[derive(Debug, Clone)]
pub struct PanelAuditEvent {
    pub timestamp: SystemTime,
    pub stage: PanelAuditStage,
    pub details: Vec<(String, Value)>,
}

impl PanelAuditEvent {
    fn new(stage: PanelAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }
}

/// Builder helper to append fields ergonomically.
pub struct PanelAuditEventBuilder {
    event: PanelAuditEvent,
}

impl PanelAuditEventBuilder {
    pub fn new(stage: PanelAuditStage) -> Self {
        Self {
            event: PanelAuditEvent::new(stage),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> PanelAuditEvent {
        self.event
    }
}

/// Trait implemented by any audit sink.
pub trait PanelAudit: Send + Sync {
    fn record(&self, event: PanelAuditEvent);
}

/// Default no-op implementation used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullPanelAudit;

impl PanelAudit for NullPanelAudit {
    fn record(&self, _event: PanelAuditEvent) {}
}

/// Keeps every record for later inspection.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<PanelAuditEvent>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<PanelAuditStage> {
        self.events
            .lock()
            .map(|guard| guard.iter().map(|event| event.stage).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, stage: PanelAuditStage) -> usize {
        self.stages().into_iter().filter(|s| *s == stage).count()
    }
}

impl PanelAudit for RecordingAudit {
    fn record(&self, event: PanelAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
