//! The panel: a host widget, its shadow buffer, the icons and overlays
//! placed on it, and the lifecycle that ties them to a viewer.
//!
//! Concrete panels implement [`PanelHandler`]; [`Panel`] owns the handler and
//! calls into it. Hooks receive a [`PanelContext`] to read and write the
//! shadow buffer. Requests that need the handler again (repopulating after an
//! error, say) are queued on the context and applied once the hook returns.

use std::sync::mpsc::{self, Receiver, Sender};

use serde_json::{Value, json};

use crate::buffer::{CommitReport, PanelBuffer};
use crate::error::{PanelError, Result};
use crate::host::{
    ClickEvent, CloseEvent, DragEvent, Host, HostEvent, SlotIndex, Subscription, ViewerId,
    WidgetId,
};
use crate::icon::Icon;
use crate::item::SlotItem;
use crate::layout::grid::inv_size_for_count;
use crate::logging::{LogLevel, PANEL_TARGET, event_with_fields, json_kv};
use crate::metrics::PanelMetrics;
use crate::overlay::ErrorOverlay;
use crate::registry::SlotRegistry;

use super::audit::{PanelAuditEventBuilder, PanelAuditStage};
use super::config::PanelConfig;
use super::schedule::{RefreshMode, RefreshTask};

mod routing;

pub use routing::RouteOutcome;

/// Where a panel is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Opening,
    Populated,
    Active,
    Refreshing,
    Closed,
}

/// Behaviour supplied by a concrete panel.
pub trait PanelHandler: Send {
    /// Fill the shadow buffer. Runs on first open and on every refresh.
    fn populate(&mut self, panel: &mut PanelContext<'_>) -> Result<()>;

    /// Click inside the panel that no icon action claimed.
    fn on_panel_gesture(&mut self, panel: &mut PanelContext<'_>, event: &mut ClickEvent)
    -> Result<()>;

    /// Click in another container (usually the viewer's own inventory)
    /// while this panel is open.
    fn on_foreign_gesture(
        &mut self,
        _panel: &mut PanelContext<'_>,
        _event: &mut ClickEvent,
    ) -> Result<()> {
        Ok(())
    }

    /// The last viewer closed the panel.
    fn on_close(&mut self, _panel: &mut PanelContext<'_>, _event: &CloseEvent) -> Result<()> {
        Ok(())
    }

    /// Only called when drag support is enabled.
    fn on_drag(&mut self, _panel: &mut PanelContext<'_>, _event: &mut DragEvent) -> Result<()> {
        Ok(())
    }

    /// Runs after each scheduled refresh.
    fn on_tick(&mut self, _panel: &mut PanelContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Requests marshaled onto the authoritative context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Repopulate,
    ShowError {
        slot: SlotIndex,
        title: String,
        subtitle: Vec<String>,
    },
    Open(ViewerId),
    Close,
}

/// Cloneable, thread-safe mailbox into a panel. Commands run on the panel's
/// next [`Panel::drive`]. Sends report false once the panel is gone.
#[derive(Clone, Debug)]
pub struct PanelHandle {
    tx: Sender<PanelCommand>,
}

impl PanelHandle {
    pub fn send(&self, command: PanelCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn request_repopulate(&self) -> bool {
        self.send(PanelCommand::Repopulate)
    }

    pub fn show_error(&self, slot: SlotIndex, title: impl Into<String>, subtitle: Vec<String>) -> bool {
        self.send(PanelCommand::ShowError {
            slot,
            title: title.into(),
            subtitle,
        })
    }

    pub fn schedule_open(&self, viewer: ViewerId) -> bool {
        self.send(PanelCommand::Open(viewer))
    }

    pub fn close(&self) -> bool {
        self.send(PanelCommand::Close)
    }
}

/// Framework-owned panel state, shared by [`Panel`] and [`PanelContext`].
struct PanelCore {
    config: PanelConfig,
    buffer: PanelBuffer,
    slots: SlotRegistry,
    viewer: Option<ViewerId>,
    populated: bool,
    lifecycle: Lifecycle,
    refresh: Option<RefreshTask>,
    subscription: Option<Subscription>,
    repopulate_requested: bool,
    outbox: Sender<PanelCommand>,
    inbox: Receiver<PanelCommand>,
}

impl PanelCore {
    fn new(config: PanelConfig, buffer: PanelBuffer, subscription: Subscription) -> Self {
        let (outbox, inbox) = mpsc::channel();
        Self {
            config,
            buffer,
            slots: SlotRegistry::new(),
            viewer: None,
            populated: false,
            lifecycle: Lifecycle::Created,
            refresh: None,
            subscription: Some(subscription),
            repopulate_requested: false,
            outbox,
            inbox,
        }
    }

    fn set_slot(&mut self, slot: SlotIndex, icon: Option<Icon>) -> Result<()> {
        self.buffer.set(slot, icon.as_ref().map(|icon| icon.item().clone()))?;
        self.slots.set_icon(slot, icon);
        Ok(())
    }

    fn store_error(&mut self, slot: SlotIndex, title: String, subtitle: Vec<String>, now_ms: i64) -> Result<()> {
        let size = self.buffer.size();
        if slot >= size {
            return Err(PanelError::SlotOutOfRange { slot, size });
        }
        let overlay = ErrorOverlay::starting_at(title, subtitle, now_ms, self.config.error_duration_ms);
        self.log(
            LogLevel::Debug,
            "error_overlay_stored",
            [
                json_kv("slot", json!(slot)),
                json_kv("expires_at_ms", json!(overlay.expires_at_epoch_ms)),
            ],
        );
        self.slots.put_overlay(slot, overlay);
        Ok(())
    }

    fn set_refresh_interval(&mut self, now_tick: u64, ticks: u64, mode: RefreshMode) -> Result<()> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(PanelError::Closed);
        }
        self.cancel_refresh();
        self.refresh = Some(RefreshTask::start(mode, now_tick, ticks)?);
        self.log(
            LogLevel::Debug,
            "refresh_armed",
            [
                json_kv("ticks", json!(ticks)),
                json_kv("mode", json!(format!("{mode:?}"))),
            ],
        );
        Ok(())
    }

    fn cancel_refresh(&mut self) {
        if let Some(mut task) = self.refresh.take() {
            task.cancel();
        }
    }

    fn close_all(&mut self, host: &mut dyn Host) -> Result<()> {
        for viewer in self.buffer.viewers(host) {
            host.close_view(viewer)?;
        }
        Ok(())
    }

    fn commit(&mut self, host: &mut dyn Host) -> Result<CommitReport> {
        let report = self.buffer.commit(host)?;
        self.record_metrics(|metrics| metrics.record_commit(report.changed));
        self.audit(
            PanelAuditStage::Committed,
            [("changed", json!(report.changed))],
        );
        Ok(report)
    }

    fn post(&self, command: PanelCommand) {
        // The receiver lives in this struct, so the send cannot fail.
        let _ = self.outbox.send(command);
    }

    fn audit<I>(&self, stage: PanelAuditStage, details: I)
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        let builder = details.into_iter().fold(
            PanelAuditEventBuilder::new(stage).detail("widget", json!(self.buffer.widget().0)),
            |builder, (key, value)| builder.detail(key, value),
        );
        self.config.audit.record(builder.finish());
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let fields =
                std::iter::once(json_kv("widget", json!(self.buffer.widget().0))).chain(fields);
            let event = event_with_fields(level, PANEL_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_metrics(&self, record: impl FnOnce(&mut PanelMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }
}

/// View handed to [`PanelHandler`] hooks.
pub struct PanelContext<'a> {
    core: &'a mut PanelCore,
    host: &'a mut dyn Host,
}

impl<'a> PanelContext<'a> {
    pub fn host(&mut self) -> &mut dyn Host {
        &mut *self.host
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.core.viewer
    }

    pub fn widget(&self) -> WidgetId {
        self.core.buffer.widget()
    }

    pub fn size(&self) -> usize {
        self.core.buffer.size()
    }

    pub fn now_ms(&self) -> i64 {
        self.host.now_epoch_ms()
    }

    /// The shadow buffer, for content queries.
    pub fn buffer(&self) -> &PanelBuffer {
        &self.core.buffer
    }

    pub fn icon(&self, slot: SlotIndex) -> Option<&Icon> {
        self.core.slots.icon(slot)
    }

    /// Place (or with `None`, remove) an interactive icon.
    pub fn set_slot(&mut self, slot: SlotIndex, icon: Option<Icon>) -> Result<()> {
        self.core.set_slot(slot, icon)
    }

    /// Write a plain, non-interactive item into the shadow buffer.
    pub fn set_item(&mut self, slot: SlotIndex, item: Option<SlotItem>) -> Result<()> {
        self.core.buffer.set(slot, item)
    }

    /// Show an error overlay on `slot`; rendered once the current hook returns.
    pub fn show_error(
        &mut self,
        slot: SlotIndex,
        title: impl Into<String>,
        subtitle: Vec<String>,
    ) -> Result<()> {
        let title = title.into();
        if !self.host.is_authoritative_context() {
            self.core.post(PanelCommand::ShowError {
                slot,
                title,
                subtitle,
            });
            return Ok(());
        }
        let now = self.host.now_epoch_ms();
        self.core.store_error(slot, title, subtitle, now)?;
        self.core.repopulate_requested = true;
        Ok(())
    }

    pub fn request_repopulate(&mut self) {
        self.core.repopulate_requested = true;
    }

    pub fn set_refresh_interval(&mut self, ticks: u64, mode: RefreshMode) -> Result<()> {
        let now_tick = self.host.current_tick();
        self.core.set_refresh_interval(now_tick, ticks, mode)
    }

    pub fn cancel_refresh(&mut self) {
        self.core.cancel_refresh();
    }

    /// Close the panel for everyone looking at it.
    pub fn close(&mut self) -> Result<()> {
        self.core.close_all(&mut *self.host)
    }

    /// Open the panel for `viewer` on the next drive.
    pub fn schedule_open(&mut self, viewer: ViewerId) {
        self.core.post(PanelCommand::Open(viewer));
    }

    pub fn handle(&self) -> PanelHandle {
        PanelHandle {
            tx: self.core.outbox.clone(),
        }
    }
}

/// A slot-grid panel driven by a [`PanelHandler`].
pub struct Panel<P: PanelHandler> {
    core: PanelCore,
    handler: P,
}

impl<P: PanelHandler> Panel<P> {
    /// Allocate a widget of the normalized size and subscribe to its events.
    pub fn new(host: &mut dyn Host, config: PanelConfig, handler: P) -> Result<Self> {
        let size = inv_size_for_count(config.requested_size);
        let widget = host.create_widget(&config.title, size)?;
        let buffer = PanelBuffer::new(widget, size);
        Ok(Self::assemble(host, config, buffer, handler))
    }

    /// Wrap a widget the host already created.
    pub fn with_widget(
        host: &mut dyn Host,
        widget: WidgetId,
        config: PanelConfig,
        handler: P,
    ) -> Result<Self> {
        let buffer = PanelBuffer::from_widget(host, widget)?;
        Ok(Self::assemble(host, config, buffer, handler))
    }

    fn assemble(host: &mut dyn Host, config: PanelConfig, buffer: PanelBuffer, handler: P) -> Self {
        let subscription = host.subscribe(buffer.widget());
        let core = PanelCore::new(config, buffer, subscription);
        core.audit(
            PanelAuditStage::Constructed,
            [("size", json!(core.buffer.size()))],
        );
        core.log(
            LogLevel::Debug,
            "panel_constructed",
            [
                json_kv("size", json!(core.buffer.size())),
                json_kv("title", json!(core.config.title)),
            ],
        );
        Self { core, handler }
    }

    pub fn widget(&self) -> WidgetId {
        self.core.buffer.widget()
    }

    pub fn title(&self) -> &str {
        &self.core.config.title
    }

    pub fn size(&self) -> usize {
        self.core.buffer.size()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.core.lifecycle
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.core.viewer
    }

    pub fn is_populated(&self) -> bool {
        self.core.populated
    }

    pub fn buffer(&self) -> &PanelBuffer {
        &self.core.buffer
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.core.slots
    }

    pub fn config(&self) -> &PanelConfig {
        &self.core.config
    }

    pub fn handler(&self) -> &P {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut P {
        &mut self.handler
    }

    pub fn handle(&self) -> PanelHandle {
        PanelHandle {
            tx: self.core.outbox.clone(),
        }
    }

    pub fn refresh_mode(&self) -> Option<RefreshMode> {
        self.core.refresh.as_ref().map(RefreshTask::mode)
    }

    /// Whether host events for the widget still reach this panel.
    pub fn is_listening(&self, host: &dyn Host) -> bool {
        self.core
            .subscription
            .is_some_and(|subscription| host.is_subscribed(subscription))
    }

    pub fn set_slot(&mut self, slot: SlotIndex, icon: Option<Icon>) -> Result<()> {
        self.core.set_slot(slot, icon)
    }

    pub fn set_item(&mut self, slot: SlotIndex, item: Option<SlotItem>) -> Result<()> {
        self.core.buffer.set(slot, item)
    }

    pub fn set_allow_drag(&mut self, allow: bool) {
        self.core.config.allow_drag = allow;
    }

    pub fn set_allow_shift_route(&mut self, allow: bool) {
        self.core.config.allow_shift_route = allow;
    }

    pub fn set_raw_slot_access(&mut self, allow: bool) {
        self.core.config.raw_slot_access = allow;
    }

    /// Show the panel to `viewer`, populating and committing it first if it
    /// has never been populated.
    ///
    /// If populating or displaying fails, the panel returns to the state it
    /// was in before the call and the error propagates.
    pub fn open(&mut self, host: &mut dyn Host, viewer: ViewerId) -> Result<()> {
        if self.core.subscription.is_none() {
            self.core.subscription = Some(host.subscribe(self.widget()));
        }
        let previous = self.core.lifecycle;
        self.core.lifecycle = Lifecycle::Opening;
        let result = self.show_to(host, viewer);
        // Failures after the widget is displayed leave the panel active.
        if result.is_err() && self.core.lifecycle != Lifecycle::Active {
            self.core.lifecycle = previous;
        }
        result
    }

    fn show_to(&mut self, host: &mut dyn Host, viewer: ViewerId) -> Result<()> {
        self.core.viewer = Some(viewer);
        self.core
            .audit(PanelAuditStage::Opening, [("viewer", json!(viewer.0))]);

        if !self.core.populated {
            self.with_context(host, |handler, ctx| handler.populate(ctx))?;
            self.core.commit(host)?;
            self.core.populated = true;
            self.core.lifecycle = Lifecycle::Populated;
            self.core
                .audit(PanelAuditStage::Populated, std::iter::empty());
        }

        host.open_widget(self.widget(), viewer)?;
        self.core.lifecycle = Lifecycle::Active;
        self.core
            .audit(PanelAuditStage::Activated, [("viewer", json!(viewer.0))]);
        self.core.log(
            LogLevel::Info,
            "panel_opened",
            [json_kv("viewer", json!(viewer.0))],
        );
        self.settle(host)
    }

    /// Close the widget for every current viewer.
    pub fn close(&mut self, host: &mut dyn Host) -> Result<()> {
        self.core.close_all(host)
    }

    /// Rebuild the shadow buffer from scratch and commit it.
    ///
    /// Skipped (apart from clearing the shadow) when the bound viewer has
    /// gone offline. The lifecycle state is restored afterwards, whether or
    /// not the handler succeeded.
    pub fn repopulate(&mut self, host: &mut dyn Host) -> Result<()> {
        let resume = self.core.lifecycle;
        if resume != Lifecycle::Closed {
            self.core.lifecycle = Lifecycle::Refreshing;
        }
        let result = self.rebuild(host);
        self.core.lifecycle = resume;
        result
    }

    fn rebuild(&mut self, host: &mut dyn Host) -> Result<()> {
        self.core.buffer.clear_all();

        let live = self.core.viewer.is_none_or(|viewer| host.is_online(viewer));
        if live {
            self.core
                .audit(PanelAuditStage::RefreshStarted, std::iter::empty());
            self.with_context(host, |handler, ctx| handler.populate(ctx))?;
            // Overlays stored while populating are rendered by this pass.
            self.core.repopulate_requested = false;

            let expired = self.core.slots.sweep_expired(host.now_epoch_ms());
            if !expired.is_empty() {
                self.core.record_metrics(|m| m.record_overlays_expired(expired.len()));
                self.core.log(
                    LogLevel::Debug,
                    "error_overlays_expired",
                    [json_kv("slots", json!(expired))],
                );
            }
            self.core.slots.render_into(&mut self.core.buffer)?;
            self.core.commit(host)?;
        } else {
            self.core.audit(
                PanelAuditStage::RefreshSkipped,
                [("viewer", json!(self.core.viewer.map(|v| v.0)))],
            );
            self.core
                .log(LogLevel::Debug, "refresh_skipped_offline", std::iter::empty());
        }
        self.core.record_metrics(|m| m.record_repopulation(!live));

        self.core.populated = true;
        Ok(())
    }

    /// Put an error overlay on `slot` and repopulate so it shows.
    ///
    /// Off the authoritative context the request is queued for the next
    /// [`drive`](Self::drive) instead.
    pub fn show_error(
        &mut self,
        host: &mut dyn Host,
        slot: SlotIndex,
        title: impl Into<String>,
        subtitle: Vec<String>,
    ) -> Result<()> {
        let title = title.into();
        if !host.is_authoritative_context() {
            self.core.post(PanelCommand::ShowError {
                slot,
                title,
                subtitle,
            });
            return Ok(());
        }
        self.core
            .store_error(slot, title, subtitle, host.now_epoch_ms())?;
        self.repopulate(host)
    }

    /// Replace any refresh task with one firing every `ticks`.
    pub fn set_refresh_interval(&mut self, host: &mut dyn Host, ticks: u64, mode: RefreshMode) -> Result<()> {
        self.core
            .set_refresh_interval(host.current_tick(), ticks, mode)
    }

    pub fn cancel_refresh(&mut self) {
        self.core.cancel_refresh();
    }

    /// Queue an open for the next drive.
    pub fn schedule_open(&mut self, viewer: ViewerId) {
        self.core.post(PanelCommand::Open(viewer));
    }

    /// Route a host event. Events for other widgets, or arriving after
    /// teardown, come back as [`RouteOutcome::Ignored`].
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &mut HostEvent) -> Result<RouteOutcome> {
        if !self.is_listening(host) || self.core.lifecycle == Lifecycle::Created {
            return Ok(RouteOutcome::Ignored);
        }

        let outcome = match &mut *event {
            HostEvent::Click(click) => self.route_click(host, click)?,
            HostEvent::Close(close) => self.route_close(host, *close)?,
            HostEvent::Drag(drag) => self.route_drag(host, drag)?,
        };

        if outcome != RouteOutcome::Ignored {
            if let HostEvent::Click(click) = &*event {
                let vetoed = click.is_vetoed();
                self.core.record_metrics(|m| m.record_gesture(vetoed));
            }
            self.core.log(
                LogLevel::Trace,
                "event_routed",
                [
                    json_kv("event", json!(event.describe())),
                    json_kv("viewer", json!(event.viewer().0)),
                    json_kv("outcome", json!(outcome.describe())),
                    json_kv("vetoed", json!(event.is_vetoed())),
                ],
            );
        }
        Ok(outcome)
    }

    /// Run queued commands, then the refresh task if it is due.
    pub fn drive(&mut self, host: &mut dyn Host) -> Result<()> {
        while let Ok(command) = self.core.inbox.try_recv() {
            self.apply_command(host, command)?;
        }

        let now_tick = host.current_tick();
        let due = self
            .core
            .refresh
            .as_mut()
            .is_some_and(|task| task.take_due(now_tick));
        if due {
            self.repopulate(host)?;
            self.with_context(host, |handler, ctx| handler.on_tick(ctx))?;
            self.settle(host)?;
        }
        Ok(())
    }

    fn apply_command(&mut self, host: &mut dyn Host, command: PanelCommand) -> Result<()> {
        match command {
            PanelCommand::Repopulate => self.repopulate(host),
            PanelCommand::ShowError {
                slot,
                title,
                subtitle,
            } => {
                self.core
                    .store_error(slot, title, subtitle, host.now_epoch_ms())?;
                self.repopulate(host)
            }
            PanelCommand::Open(viewer) => self.open(host, viewer),
            PanelCommand::Close => self.close(host),
        }
    }

    fn with_context<R>(
        &mut self,
        host: &mut dyn Host,
        hook: impl FnOnce(&mut P, &mut PanelContext<'_>) -> Result<R>,
    ) -> Result<R> {
        let mut ctx = PanelContext {
            core: &mut self.core,
            host,
        };
        hook(&mut self.handler, &mut ctx)
    }

    /// Apply a repopulate requested from inside a hook.
    fn settle(&mut self, host: &mut dyn Host) -> Result<()> {
        if std::mem::take(&mut self.core.repopulate_requested) {
            self.repopulate(host)?;
        }
        Ok(())
    }
}
