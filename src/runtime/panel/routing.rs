//! Gesture, close and drag routing for a panel.

use serde_json::json;

use crate::error::Result;
use crate::host::{ClickEvent, ClickTarget, CloseEvent, DragEvent, Host, SlotIndex, ViewerId};
use crate::logging::{LogLevel, json_kv};
use crate::render::wrap_words;

use super::super::audit::PanelAuditStage;
use super::{Lifecycle, Panel, PanelHandler};

/// What routing did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not addressed to this panel.
    Ignored,
    /// Click in another container, handed to the foreign-gesture hook.
    Foreign,
    /// Click the host could not attribute to a container; vetoed.
    Vetoed,
    ActionSucceeded { slot: SlotIndex },
    ActionFailed { slot: SlotIndex, message: String },
    /// No icon action claimed the click; handed to the panel-gesture hook.
    Fallback { slot: SlotIndex },
    DragVetoed,
    DragForwarded,
    /// A viewer left while others still have the widget open.
    ViewerDeparted,
    TornDown,
}

impl RouteOutcome {
    pub fn describe(&self) -> &'static str {
        match self {
            RouteOutcome::Ignored => "ignored",
            RouteOutcome::Foreign => "foreign",
            RouteOutcome::Vetoed => "vetoed",
            RouteOutcome::ActionSucceeded { .. } => "action_succeeded",
            RouteOutcome::ActionFailed { .. } => "action_failed",
            RouteOutcome::Fallback { .. } => "fallback",
            RouteOutcome::DragVetoed => "drag_vetoed",
            RouteOutcome::DragForwarded => "drag_forwarded",
            RouteOutcome::ViewerDeparted => "viewer_departed",
            RouteOutcome::TornDown => "torn_down",
        }
    }
}

impl<P: PanelHandler> Panel<P> {
    pub(super) fn route_click(
        &mut self,
        host: &mut dyn Host,
        event: &mut ClickEvent,
    ) -> Result<RouteOutcome> {
        let widget = self.widget();
        if !host.viewers(widget).contains(&event.viewer) {
            return Ok(RouteOutcome::Ignored);
        }

        // Stack moves a slot grid never supports, wherever the click landed.
        if event.action.is_always_denied() {
            event.veto();
        }
        if !self.core.config.allow_shift_route
            && (event.action.is_container_move() || event.gesture.is_shift())
        {
            event.veto();
        }

        match event.target {
            ClickTarget::Widget(target) if target == widget => {}
            ClickTarget::Unresolved if !self.core.config.raw_slot_access => {
                event.veto();
                return Ok(RouteOutcome::Vetoed);
            }
            _ => {
                self.with_context(host, |handler, ctx| handler.on_foreign_gesture(ctx, event))?;
                self.settle(host)?;
                return Ok(RouteOutcome::Foreign);
            }
        }

        // The panel owns rendering of its own slots.
        event.veto();

        let slot = event.raw_slot;
        let action = self
            .core
            .slots
            .icon(slot)
            .and_then(|icon| icon.action_for(event.gesture))
            .cloned();

        if let Some(action) = action {
            let failure = action(event.viewer, slot);
            self.core
                .record_metrics(|m| m.record_action(failure.is_some()));
            return match failure {
                Some(message) => {
                    self.report_failure(host, event.viewer, slot, &message)?;
                    Ok(RouteOutcome::ActionFailed { slot, message })
                }
                None => Ok(RouteOutcome::ActionSucceeded { slot }),
            };
        }

        self.with_context(host, |handler, ctx| handler.on_panel_gesture(ctx, event))?;
        self.settle(host)?;
        Ok(RouteOutcome::Fallback { slot })
    }

    pub(super) fn route_close(
        &mut self,
        host: &mut dyn Host,
        event: CloseEvent,
    ) -> Result<RouteOutcome> {
        if event.widget != self.widget() {
            return Ok(RouteOutcome::Ignored);
        }

        let remaining = host
            .viewers(event.widget)
            .into_iter()
            .filter(|viewer| *viewer != event.viewer)
            .count();

        if remaining > 0 {
            if self.core.viewer == Some(event.viewer) {
                self.core.viewer = None;
            }
            self.core.audit(
                PanelAuditStage::ViewerDeparted,
                [
                    ("viewer", json!(event.viewer.0)),
                    ("remaining", json!(remaining)),
                ],
            );
            self.core.log(
                LogLevel::Debug,
                "viewer_departed",
                [
                    json_kv("viewer", json!(event.viewer.0)),
                    json_kv("remaining", json!(remaining)),
                ],
            );
            return Ok(RouteOutcome::ViewerDeparted);
        }

        self.teardown(host, &event)?;
        Ok(RouteOutcome::TornDown)
    }

    pub(super) fn route_drag(
        &mut self,
        host: &mut dyn Host,
        event: &mut DragEvent,
    ) -> Result<RouteOutcome> {
        if event.widget != self.widget() {
            return Ok(RouteOutcome::Ignored);
        }

        if !self.core.config.allow_drag {
            event.veto();
            return Ok(RouteOutcome::DragVetoed);
        }

        self.with_context(host, |handler, ctx| handler.on_drag(ctx, event))?;
        self.settle(host)?;
        Ok(RouteOutcome::DragForwarded)
    }

    fn report_failure(
        &mut self,
        host: &mut dyn Host,
        viewer: ViewerId,
        slot: SlotIndex,
        message: &str,
    ) -> Result<()> {
        let lines = wrap_words(message, self.core.config.wrap_width);
        let title = self.core.config.error_title.clone();
        self.core.log(
            LogLevel::Info,
            "action_failed",
            [
                json_kv("viewer", json!(viewer.0)),
                json_kv("slot", json!(slot)),
                json_kv("message", json!(message)),
            ],
        );
        self.show_error(host, slot, title, lines)?;
        let cue = self.core.config.failure_cue.clone();
        host.play_sound(viewer, &cue);
        Ok(())
    }

    fn teardown(&mut self, host: &mut dyn Host, event: &CloseEvent) -> Result<()> {
        self.core.cancel_refresh();
        if let Some(subscription) = self.core.subscription.take() {
            host.unsubscribe(subscription);
        }
        self.core.lifecycle = Lifecycle::Closed;
        self.core.audit(
            PanelAuditStage::TornDown,
            [("viewer", json!(event.viewer.0))],
        );
        self.core
            .log(LogLevel::Info, "panel_torn_down", std::iter::empty());

        self.with_context(host, |handler, ctx| handler.on_close(ctx, event))?;
        self.core.repopulate_requested = false;
        Ok(())
    }
}
