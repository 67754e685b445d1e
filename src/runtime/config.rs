//! Panel and runtime configuration.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::SoundCue;
use crate::logging::Logger;
use crate::metrics::PanelMetrics;
use crate::overlay::{DEFAULT_ERROR_DURATION_MS, DEFAULT_ERROR_TITLE};
use crate::render::DEFAULT_WRAP_WIDTH;

use super::audit::{NullPanelAudit, PanelAudit};

/// Configuration knobs for a single panel.
#[derive(Clone)]
pub struct PanelConfig {
    /// Title shown on the widget.
    pub title: String,
    /// Requested slot count, normalized to whole rows between 9 and 54.
    pub requested_size: i64,
    /// Forward drags to the handler instead of vetoing them.
    pub allow_drag: bool,
    /// Let shift-clicks move stacks between containers.
    pub allow_shift_route: bool,
    /// Route clicks the host could not attribute to a container to the
    /// foreign-gesture hook instead of vetoing them.
    pub raw_slot_access: bool,
    pub error_title: String,
    pub error_duration_ms: i64,
    /// Column width failure messages are wrapped to.
    pub wrap_width: usize,
    pub failure_cue: SoundCue,
    pub logger: Option<Logger>,
    pub metrics: Option<Arc<Mutex<PanelMetrics>>>,
    pub audit: Arc<dyn PanelAudit>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            requested_size: 9,
            allow_drag: false,
            allow_shift_route: false,
            raw_slot_access: false,
            error_title: DEFAULT_ERROR_TITLE.to_string(),
            error_duration_ms: DEFAULT_ERROR_DURATION_MS,
            wrap_width: DEFAULT_WRAP_WIDTH,
            failure_cue: SoundCue::failure(),
            logger: None,
            metrics: None,
            audit: Arc::new(NullPanelAudit),
        }
    }
}

impl PanelConfig {
    pub fn new(title: impl Into<String>, requested_size: i64) -> Self {
        Self {
            title: title.into(),
            requested_size,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: PanelSettings) -> Self {
        settings.apply_to(Self::default())
    }

    pub fn with_allow_drag(mut self, allow: bool) -> Self {
        self.allow_drag = allow;
        self
    }

    pub fn with_allow_shift_route(mut self, allow: bool) -> Self {
        self.allow_shift_route = allow;
        self
    }

    pub fn with_raw_slot_access(mut self, allow: bool) -> Self {
        self.raw_slot_access = allow;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn PanelAudit>) -> Self {
        self.audit = audit;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(PanelMetrics::new())));
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Mutex<PanelMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<PanelMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Serializable subset of [`PanelConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub title: String,
    pub size: i64,
    pub allow_drag: bool,
    pub allow_shift_route: bool,
    pub raw_slot_access: bool,
    pub error_title: String,
    pub error_duration_ms: i64,
    pub wrap_width: usize,
    pub failure_cue: SoundCue,
}

impl Default for PanelSettings {
    fn default() -> Self {
        let config = PanelConfig::default();
        Self {
            title: config.title,
            size: config.requested_size,
            allow_drag: config.allow_drag,
            allow_shift_route: config.allow_shift_route,
            raw_slot_access: config.raw_slot_access,
            error_title: config.error_title,
            error_duration_ms: config.error_duration_ms,
            wrap_width: config.wrap_width,
            failure_cue: config.failure_cue,
        }
    }
}

impl PanelSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Overwrite the tunables of `config`, keeping its logger, metrics and audit.
    pub fn apply_to(self, config: PanelConfig) -> PanelConfig {
        PanelConfig {
            title: self.title,
            requested_size: self.size,
            allow_drag: self.allow_drag,
            allow_shift_route: self.allow_shift_route,
            raw_slot_access: self.raw_slot_access,
            error_title: self.error_title,
            error_duration_ms: self.error_duration_ms,
            wrap_width: self.wrap_width,
            failure_cue: self.failure_cue,
            ..config
        }
    }
}

/// Configuration knobs for [`PanelRuntime`](super::PanelRuntime).
#[derive(Clone)]
pub struct RuntimeConfig {
    pub logger: Option<Logger>,
    /// Metrics shared with the panels the runtime drives.
    pub metrics: Option<Arc<Mutex<PanelMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    pub metrics_target: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "slotgrid::runtime.metrics".to_string(),
        }
    }
}
