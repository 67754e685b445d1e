//! Contract consumed from the host application.
//!
//! The host owns the authoritative widgets, knows who is looking at them and
//! delivers click/close/drag events. Panels only ever talk to it through
//! [`Host`], which keeps the framework independent of any concrete server.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::gesture::{GestureType, RawAction};
use crate::item::SlotItem;

pub mod sim;

pub use sim::SimHost;

/// Slot position inside a widget, counted from zero.
pub type SlotIndex = usize;

/// Full contents of a widget, one entry per slot.
pub type SlotContents = Vec<Option<SlotItem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// Handle for an event subscription on one widget. Released explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub id: u64,
    pub widget: WidgetId,
}

/// Audible cue sent to a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub key: String,
    pub volume: f32,
    pub pitch: f32,
}

impl SoundCue {
    pub const NOTE_BLOCK_BASS: &'static str = "block.note_block.bass";

    pub fn new(key: impl Into<String>, volume: f32, pitch: f32) -> Self {
        Self {
            key: key.into(),
            volume,
            pitch,
        }
    }

    /// Cue played when a slot action reports a failure.
    pub fn failure() -> Self {
        Self::new(Self::NOTE_BLOCK_BASS, 1.0, 1.0)
    }
}

impl Default for SoundCue {
    fn default() -> Self {
        Self::failure()
    }
}

/// Which container a click resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Widget(WidgetId),
    /// Outside both containers (window border, dropped on the floor, ...).
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub viewer: ViewerId,
    pub target: ClickTarget,
    pub raw_slot: SlotIndex,
    pub gesture: GestureType,
    pub action: RawAction,
    vetoed: bool,
}

impl ClickEvent {
    pub fn new(
        viewer: ViewerId,
        target: ClickTarget,
        raw_slot: SlotIndex,
        gesture: GestureType,
        action: RawAction,
    ) -> Self {
        Self {
            viewer,
            target,
            raw_slot,
            gesture,
            action,
            vetoed: false,
        }
    }

    /// Click on `slot` of `widget` with the host's usual action for `gesture`.
    pub fn on_widget(viewer: ViewerId, widget: WidgetId, slot: SlotIndex, gesture: GestureType) -> Self {
        let action = match gesture {
            GestureType::ShiftLeft | GestureType::ShiftRight => RawAction::MoveToOtherInventory,
            GestureType::Right => RawAction::PickupHalf,
            GestureType::NumberKey => RawAction::HotbarSwap,
            GestureType::Drop => RawAction::DropOneSlot,
            GestureType::ControlDrop => RawAction::DropAllSlot,
            GestureType::Creative => RawAction::CloneStack,
            GestureType::DoubleClick | GestureType::Middle => RawAction::Nothing,
            GestureType::Unknown => RawAction::Unknown,
            _ => RawAction::PickupAll,
        };
        Self::new(viewer, ClickTarget::Widget(widget), slot, gesture, action)
    }

    pub fn with_action(mut self, action: RawAction) -> Self {
        self.action = action;
        self
    }

    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseEvent {
    pub widget: WidgetId,
    pub viewer: ViewerId,
}

#[derive(Debug, Clone)]
pub struct DragEvent {
    pub widget: WidgetId,
    pub viewer: ViewerId,
    pub slots: Vec<SlotIndex>,
    vetoed: bool,
}

impl DragEvent {
    pub fn new(widget: WidgetId, viewer: ViewerId, slots: Vec<SlotIndex>) -> Self {
        Self {
            widget,
            viewer,
            slots,
            vetoed: false,
        }
    }

    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }
}

/// Events delivered by the host to subscribed panels.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Click(ClickEvent),
    Close(CloseEvent),
    Drag(DragEvent),
}

impl HostEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            HostEvent::Click(_) => "click",
            HostEvent::Close(_) => "close",
            HostEvent::Drag(_) => "drag",
        }
    }

    pub fn viewer(&self) -> ViewerId {
        match self {
            HostEvent::Click(event) => event.viewer,
            HostEvent::Close(event) => event.viewer,
            HostEvent::Drag(event) => event.viewer,
        }
    }

    pub fn is_vetoed(&self) -> bool {
        match self {
            HostEvent::Click(event) => event.is_vetoed(),
            HostEvent::Drag(event) => event.is_vetoed(),
            HostEvent::Close(_) => false,
        }
    }
}

/// Widget, viewer, clock and event-bus primitives provided by the host.
///
/// Every method is called on the host's authoritative context.
pub trait Host {
    fn create_widget(&mut self, title: &str, size: usize) -> Result<WidgetId>;

    fn widget_size(&self, widget: WidgetId) -> Result<usize>;

    fn widget_title(&self, widget: WidgetId) -> Result<String>;

    /// Display `widget` to `viewer`, replacing whatever they had open.
    fn open_widget(&mut self, widget: WidgetId, viewer: ViewerId) -> Result<()>;

    /// Close whatever `viewer` currently has open.
    fn close_view(&mut self, viewer: ViewerId) -> Result<()>;

    fn widget_contents(&self, widget: WidgetId) -> Result<SlotContents>;

    /// Replace the full contents of `widget` in one call.
    fn set_widget_contents(&mut self, widget: WidgetId, contents: &[Option<SlotItem>]) -> Result<()>;

    fn viewers(&self, widget: WidgetId) -> Vec<ViewerId>;

    fn is_online(&self, viewer: ViewerId) -> bool;

    fn play_sound(&mut self, viewer: ViewerId, cue: &SoundCue);

    fn now_epoch_ms(&self) -> i64;

    fn current_tick(&self) -> u64;

    /// Whether the caller is running on the authoritative context.
    fn is_authoritative_context(&self) -> bool {
        true
    }

    /// Events the host raised on its own (closes, disconnects) since the
    /// last poll.
    fn poll_events(&mut self) -> Vec<HostEvent> {
        Vec::new()
    }

    fn subscribe(&mut self, widget: WidgetId) -> Subscription;

    fn unsubscribe(&mut self, subscription: Subscription);

    fn is_subscribed(&self, subscription: Subscription) -> bool;
}
