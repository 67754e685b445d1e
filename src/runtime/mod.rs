//! Panel lifecycle, routing and the runtime that drives panels on the
//! host's authoritative context.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::error::{PanelError, Result};
use crate::host::{Host, HostEvent, ViewerId, WidgetId};
use crate::logging::{LogLevel, RUNTIME_TARGET, event_with_fields, json_kv};

pub mod audit;
pub mod config;
pub mod panel;
pub mod schedule;

pub use audit::{NullPanelAudit, PanelAudit, PanelAuditEvent, PanelAuditStage, RecordingAudit};
pub use config::{PanelConfig, PanelSettings, RuntimeConfig};
pub use panel::{
    Lifecycle, Panel, PanelCommand, PanelContext, PanelHandle, PanelHandler, RouteOutcome,
};
pub use schedule::{MILLIS_PER_TICK, RefreshMode, RefreshTask};

/// Identifier handed out by [`PanelRuntime::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(pub u64);

/// Object-safe view of a panel, so the runtime can hold panels of
/// different handler types.
pub trait PanelDriver {
    fn title(&self) -> &str;
    fn widget(&self) -> WidgetId;
    fn lifecycle(&self) -> Lifecycle;
    fn is_listening(&self, host: &dyn Host) -> bool;
    fn open(&mut self, host: &mut dyn Host, viewer: ViewerId) -> Result<()>;
    fn handle_event(&mut self, host: &mut dyn Host, event: &mut HostEvent) -> Result<RouteOutcome>;
    fn drive(&mut self, host: &mut dyn Host) -> Result<()>;
}

impl<P: PanelHandler> PanelDriver for Panel<P> {
    fn title(&self) -> &str {
        Panel::title(self)
    }

    fn widget(&self) -> WidgetId {
        Panel::widget(self)
    }

    fn lifecycle(&self) -> Lifecycle {
        Panel::lifecycle(self)
    }

    fn is_listening(&self, host: &dyn Host) -> bool {
        Panel::is_listening(self, host)
    }

    fn open(&mut self, host: &mut dyn Host, viewer: ViewerId) -> Result<()> {
        Panel::open(self, host, viewer)
    }

    fn handle_event(&mut self, host: &mut dyn Host, event: &mut HostEvent) -> Result<RouteOutcome> {
        Panel::handle_event(self, host, event)
    }

    fn drive(&mut self, host: &mut dyn Host) -> Result<()> {
        Panel::drive(self, host)
    }
}

/// Result of delivering one event to every listening panel.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub event: HostEvent,
    pub outcomes: Vec<(PanelId, RouteOutcome)>,
}

impl Dispatch {
    pub fn is_vetoed(&self) -> bool {
        self.event.is_vetoed()
    }

    pub fn outcome_for(&self, id: PanelId) -> Option<&RouteOutcome> {
        self.outcomes
            .iter()
            .find(|(panel, _)| *panel == id)
            .map(|(_, outcome)| outcome)
    }
}

/// Event bus plus scheduler for the panels living on one host.
///
/// Events reach only panels whose subscriptions are still live. Each
/// [`tick`](Self::tick) drains host events, drives every panel (mailboxes and
/// refresh tasks) and drops panels that have been torn down.
pub struct PanelRuntime<H: Host> {
    host: H,
    panels: BTreeMap<PanelId, Box<dyn PanelDriver>>,
    next_id: u64,
    config: RuntimeConfig,
    start_instant: Instant,
    last_metrics_emit: Option<Instant>,
}

impl<H: Host> PanelRuntime<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            panels: BTreeMap::new(),
            next_id: 1,
            config: RuntimeConfig::default(),
            start_instant: Instant::now(),
            last_metrics_emit: None,
        }
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn register<D>(&mut self, panel: D) -> PanelId
    where
        D: PanelDriver + 'static,
    {
        let id = PanelId(self.next_id);
        self.next_id += 1;
        self.log_runtime_event(
            LogLevel::Debug,
            "panel_registered",
            [
                json_kv("panel", json!(id.0)),
                json_kv("title", json!(panel.title())),
            ],
        );
        self.panels.insert(id, Box::new(panel));
        id
    }

    /// Build a panel on this runtime's host and register it. The runtime's
    /// logger and metrics are used when the config has none of its own.
    pub fn create<P>(&mut self, mut config: PanelConfig, handler: P) -> Result<PanelId>
    where
        P: PanelHandler + 'static,
    {
        if config.logger.is_none() {
            config.logger = self.config.logger.clone();
        }
        if config.metrics.is_none() {
            config.metrics = self.config.metrics.clone();
        }
        let panel = Panel::new(&mut self.host, config, handler)?;
        Ok(self.register(panel))
    }

    pub fn open(&mut self, id: PanelId, viewer: ViewerId) -> Result<()> {
        let panel = self
            .panels
            .get_mut(&id)
            .ok_or(PanelError::UnknownPanel(id.0))?;
        panel.open(&mut self.host, viewer)?;
        self.pump_host_events()?;
        Ok(())
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.contains_key(&id)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn lifecycle(&self, id: PanelId) -> Option<Lifecycle> {
        self.panels.get(&id).map(|panel| panel.lifecycle())
    }

    pub fn widget(&self, id: PanelId) -> Option<WidgetId> {
        self.panels.get(&id).map(|panel| panel.widget())
    }

    /// Deliver one event to every listening panel.
    pub fn dispatch(&mut self, mut event: HostEvent) -> Result<Dispatch> {
        let mut outcomes = Vec::new();
        for (id, panel) in self.panels.iter_mut() {
            if !panel.is_listening(&self.host) {
                continue;
            }
            let outcome = panel.handle_event(&mut self.host, &mut event)?;
            if outcome != RouteOutcome::Ignored {
                outcomes.push((*id, outcome));
            }
        }

        self.log_runtime_event(
            LogLevel::Debug,
            "event_dispatched",
            [
                json_kv("event", json!(event.describe())),
                json_kv("handled_by", json!(outcomes.len())),
                json_kv("vetoed", json!(event.is_vetoed())),
            ],
        );
        Ok(Dispatch { event, outcomes })
    }

    /// Dispatch whatever the host raised on its own. Returns how many events
    /// were delivered.
    pub fn pump_host_events(&mut self) -> Result<usize> {
        let mut delivered = 0;
        loop {
            let events = self.host.poll_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.dispatch(event)?;
                delivered += 1;
            }
        }
        self.sweep_closed();
        Ok(delivered)
    }

    /// One pass on the authoritative context.
    pub fn tick(&mut self) -> Result<()> {
        self.pump_host_events()?;
        for panel in self.panels.values_mut() {
            panel.drive(&mut self.host)?;
        }
        self.pump_host_events()?;
        self.maybe_emit_metrics();
        Ok(())
    }

    /// Dispatch a fixed list of events, draining host events after each.
    pub fn run_scripted<I>(&mut self, events: I) -> Result<Vec<Dispatch>>
    where
        I: IntoIterator<Item = HostEvent>,
    {
        let mut dispatched = Vec::new();
        for event in events {
            dispatched.push(self.dispatch(event)?);
            self.pump_host_events()?;
        }
        Ok(dispatched)
    }

    fn sweep_closed(&mut self) {
        let host = &self.host;
        let closed: Vec<PanelId> = self
            .panels
            .iter()
            .filter(|(_, panel)| {
                panel.lifecycle() == Lifecycle::Closed && !panel.is_listening(host)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in closed {
            self.panels.remove(&id);
            self.log_runtime_event(
                LogLevel::Debug,
                "panel_dropped",
                [json_kv("panel", json!(id.0))],
            );
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, RUNTIME_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics_interval == Duration::ZERO {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => {
                return;
            }
            _ => {
                self.last_metrics_emit = Some(now);
            }
        }

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let uptime = now.duration_since(self.start_instant);
                let snapshot = guard.snapshot(uptime).to_log_event(&self.config.metrics_target);
                let _ = logger.log_event(snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::gesture::GestureType;
    use crate::host::{ClickEvent, SimHost};
    use crate::item::SlotItem;
    use crate::logging::{Logger, MemorySink};

    #[derive(Default, Clone)]
    struct Counters {
        populates: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        fallbacks: Arc<AtomicUsize>,
    }

    struct Stall {
        counters: Counters,
    }

    impl PanelHandler for Stall {
        fn populate(&mut self, panel: &mut PanelContext<'_>) -> Result<()> {
            self.counters.populates.fetch_add(1, Ordering::SeqCst);
            panel.set_item(0, Some(SlotItem::of("minecraft:apple")))
        }

        fn on_panel_gesture(
            &mut self,
            _panel: &mut PanelContext<'_>,
            _event: &mut ClickEvent,
        ) -> Result<()> {
            self.counters.fallbacks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_close(&mut self, _panel: &mut PanelContext<'_>, _event: &crate::host::CloseEvent) -> Result<()> {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn runtime_with_viewer() -> (PanelRuntime<SimHost>, ViewerId) {
        let mut host = SimHost::new();
        let viewer = ViewerId(7);
        host.connect(viewer);
        (PanelRuntime::new(host), viewer)
    }

    #[test]
    fn dispatch_reaches_only_the_open_panel() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let counters = Counters::default();
        let shown = runtime
            .create(
                PanelConfig::new("Stall", 9),
                Stall {
                    counters: counters.clone(),
                },
            )
            .unwrap();
        let hidden = runtime
            .create(
                PanelConfig::new("Hidden", 9),
                Stall {
                    counters: counters.clone(),
                },
            )
            .unwrap();
        runtime.open(shown, viewer).unwrap();

        let click = runtime.host().click(viewer, 3, GestureType::Left).unwrap();
        let dispatch = runtime.dispatch(click).unwrap();

        assert!(dispatch.is_vetoed());
        assert_eq!(dispatch.outcome_for(shown), Some(&RouteOutcome::Fallback { slot: 3 }));
        assert!(dispatch.outcome_for(hidden).is_none());
        assert_eq!(counters.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_panels_are_dropped_after_teardown() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let counters = Counters::default();
        let id = runtime
            .create(
                PanelConfig::new("Stall", 9),
                Stall {
                    counters: counters.clone(),
                },
            )
            .unwrap();
        runtime.open(id, viewer).unwrap();
        assert_eq!(runtime.lifecycle(id), Some(Lifecycle::Active));

        runtime.host_mut().close_view(viewer).unwrap();
        runtime.tick().unwrap();

        assert!(!runtime.contains(id));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.panel_count(), 0);
    }

    #[test]
    fn opening_another_panel_tears_down_the_first() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let counters = Counters::default();
        let first = runtime
            .create(
                PanelConfig::new("First", 9),
                Stall {
                    counters: counters.clone(),
                },
            )
            .unwrap();
        let second = runtime
            .create(
                PanelConfig::new("Second", 9),
                Stall {
                    counters: counters.clone(),
                },
            )
            .unwrap();

        runtime.open(first, viewer).unwrap();
        runtime.open(second, viewer).unwrap();

        assert!(!runtime.contains(first));
        assert_eq!(runtime.lifecycle(second), Some(Lifecycle::Active));
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_commands_run_on_tick() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let counters = Counters::default();
        let panel = Panel::new(
            runtime.host_mut(),
            PanelConfig::new("Stall", 9),
            Stall {
                counters: counters.clone(),
            },
        )
        .unwrap();
        let handle = panel.handle();
        let id = runtime.register(panel);

        assert!(handle.schedule_open(viewer));
        runtime.tick().unwrap();

        assert_eq!(runtime.lifecycle(id), Some(Lifecycle::Active));
        assert_eq!(counters.populates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_panel_is_an_error() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let err = runtime.open(PanelId(99), viewer).unwrap_err();
        assert!(matches!(err, PanelError::UnknownPanel(99)));
    }

    #[test]
    fn runtime_logger_is_shared_with_created_panels() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let sink = Arc::new(MemorySink::new());
        runtime.config_mut().logger = Some(Logger::from_arc(sink.clone()));

        let id = runtime
            .create(
                PanelConfig::new("Stall", 9),
                Stall {
                    counters: Counters::default(),
                },
            )
            .unwrap();
        runtime.open(id, viewer).unwrap();

        assert_eq!(sink.count("panel_registered"), 1);
        assert_eq!(sink.count("panel_opened"), 1);
    }

    #[test]
    fn run_scripted_returns_one_dispatch_per_event() {
        let (mut runtime, viewer) = runtime_with_viewer();
        let id = runtime
            .create(
                PanelConfig::new("Stall", 9),
                Stall {
                    counters: Counters::default(),
                },
            )
            .unwrap();
        runtime.open(id, viewer).unwrap();

        let events = vec![
            runtime.host().click(viewer, 0, GestureType::Left).unwrap(),
            runtime.host().drag(viewer, vec![1, 2]).unwrap(),
        ];
        let dispatched = runtime.run_scripted(events).unwrap();

        assert_eq!(dispatched.len(), 2);
        assert_eq!(
            dispatched[1].outcome_for(id),
            Some(&RouteOutcome::DragVetoed)
        );
    }
}
