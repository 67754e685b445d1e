//! In-memory host used by tests, benches and demos.
//!
//! `SimHost` keeps every widget's slots in plain vectors, tracks who is
//! looking at what, records sounds, and queues the close events a real host
//! would fire. Time only moves when the caller advances it.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::error::{PanelError, Result};
use crate::gesture::GestureType;
use crate::item::SlotItem;
use crate::runtime::schedule::MILLIS_PER_TICK;

use super::{
    ClickEvent, ClickTarget, CloseEvent, DragEvent, Host, HostEvent, SlotContents, SlotIndex,
    SoundCue, Subscription, ViewerId, WidgetId,
};

const PLAYER_INVENTORY_SIZE: usize = 36;

#[derive(Debug, Clone)]
struct SimWidget {
    title: String,
    slots: SlotContents,
    writes: usize,
}

#[derive(Debug)]
pub struct SimHost {
    widgets: BTreeMap<WidgetId, SimWidget>,
    views: HashMap<ViewerId, WidgetId>,
    own_inventories: HashMap<ViewerId, WidgetId>,
    online: BTreeSet<ViewerId>,
    subscriptions: BTreeMap<u64, WidgetId>,
    next_widget: u64,
    next_subscription: u64,
    clock_ms: i64,
    tick: u64,
    authoritative: bool,
    sounds: Vec<(ViewerId, SoundCue)>,
    pending: VecDeque<HostEvent>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            widgets: BTreeMap::new(),
            views: HashMap::new(),
            own_inventories: HashMap::new(),
            online: BTreeSet::new(),
            subscriptions: BTreeMap::new(),
            next_widget: 1,
            next_subscription: 1,
            clock_ms: 1_700_000_000_000,
            tick: 0,
            authoritative: true,
            sounds: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Bring a viewer online and give them a personal inventory widget.
    pub fn connect(&mut self, viewer: ViewerId) -> WidgetId {
        self.online.insert(viewer);
        if let Some(widget) = self.own_inventories.get(&viewer) {
            return *widget;
        }
        let widget = self.allocate("inventory", PLAYER_INVENTORY_SIZE);
        self.own_inventories.insert(viewer, widget);
        widget
    }

    /// Take a viewer offline, closing whatever they had open.
    pub fn disconnect(&mut self, viewer: ViewerId) {
        self.online.remove(&viewer);
        self.close_current(viewer);
    }

    pub fn own_inventory(&self, viewer: ViewerId) -> Option<WidgetId> {
        self.own_inventories.get(&viewer).copied()
    }

    pub fn open_widget_of(&self, viewer: ViewerId) -> Option<WidgetId> {
        self.views.get(&viewer).copied()
    }

    pub fn advance_ms(&mut self, millis: i64) {
        self.clock_ms += millis;
    }

    /// Advance the tick counter, moving the clock by one tick period each.
    pub fn advance_ticks(&mut self, ticks: u64) {
        self.tick += ticks;
        self.clock_ms += (ticks * MILLIS_PER_TICK) as i64;
    }

    pub fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
    }

    pub fn sounds(&self) -> &[(ViewerId, SoundCue)] {
        &self.sounds
    }

    /// Number of full-content writes the widget has received.
    pub fn write_count(&self, widget: WidgetId) -> usize {
        self.widgets.get(&widget).map(|w| w.writes).unwrap_or(0)
    }

    pub fn slot(&self, widget: WidgetId, slot: SlotIndex) -> Option<&SlotItem> {
        self.widgets
            .get(&widget)
            .and_then(|w| w.slots.get(slot))
            .and_then(Option::as_ref)
    }

    /// Mutate a single authoritative slot, as a host echoing a user action would.
    pub fn poke_slot(&mut self, widget: WidgetId, slot: SlotIndex, item: Option<SlotItem>) {
        if let Some(entry) = self
            .widgets
            .get_mut(&widget)
            .and_then(|w| w.slots.get_mut(slot))
        {
            *entry = item;
        }
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        self.pending.drain(..).collect()
    }

    pub fn active_subscriptions(&self, widget: WidgetId) -> usize {
        self.subscriptions.values().filter(|w| **w == widget).count()
    }

    /// Build a click on whatever widget the viewer currently has open.
    pub fn click(&self, viewer: ViewerId, slot: SlotIndex, gesture: GestureType) -> Option<HostEvent> {
        let widget = self.open_widget_of(viewer)?;
        Some(HostEvent::Click(ClickEvent::on_widget(viewer, widget, slot, gesture)))
    }

    /// Build a click landing in the viewer's own inventory.
    pub fn click_own_inventory(
        &self,
        viewer: ViewerId,
        slot: SlotIndex,
        gesture: GestureType,
    ) -> Option<HostEvent> {
        let widget = self.own_inventory(viewer)?;
        Some(HostEvent::Click(ClickEvent::on_widget(viewer, widget, slot, gesture)))
    }

    /// Build a click the host could not attribute to either container.
    pub fn click_outside(&self, viewer: ViewerId, gesture: GestureType) -> HostEvent {
        let mut event = ClickEvent::on_widget(viewer, WidgetId(0), 0, gesture);
        event.target = ClickTarget::Unresolved;
        HostEvent::Click(event)
    }

    pub fn drag(&self, viewer: ViewerId, slots: Vec<SlotIndex>) -> Option<HostEvent> {
        let widget = self.open_widget_of(viewer)?;
        Some(HostEvent::Drag(DragEvent::new(widget, viewer, slots)))
    }

    fn allocate(&mut self, title: &str, size: usize) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        self.widgets.insert(
            id,
            SimWidget {
                title: title.to_string(),
                slots: vec![None; size],
                writes: 0,
            },
        );
        id
    }

    fn close_current(&mut self, viewer: ViewerId) {
        if let Some(widget) = self.views.remove(&viewer) {
            self.pending
                .push_back(HostEvent::Close(CloseEvent { widget, viewer }));
        }
    }

    fn widget(&self, widget: WidgetId) -> Result<&SimWidget> {
        self.widgets
            .get(&widget)
            .ok_or(PanelError::UnknownWidget(widget))
    }
}

impl Host for SimHost {
    fn create_widget(&mut self, title: &str, size: usize) -> Result<WidgetId> {
        Ok(self.allocate(title, size))
    }

    fn widget_size(&self, widget: WidgetId) -> Result<usize> {
        Ok(self.widget(widget)?.slots.len())
    }

    fn widget_title(&self, widget: WidgetId) -> Result<String> {
        Ok(self.widget(widget)?.title.clone())
    }

    fn open_widget(&mut self, widget: WidgetId, viewer: ViewerId) -> Result<()> {
        self.widget(widget)?;
        if !self.online.contains(&viewer) {
            return Err(PanelError::Host(format!("{viewer} is not online")));
        }
        if self.views.get(&viewer) == Some(&widget) {
            return Ok(());
        }
        self.close_current(viewer);
        self.views.insert(viewer, widget);
        Ok(())
    }

    fn close_view(&mut self, viewer: ViewerId) -> Result<()> {
        self.close_current(viewer);
        Ok(())
    }

    fn widget_contents(&self, widget: WidgetId) -> Result<SlotContents> {
        Ok(self.widget(widget)?.slots.clone())
    }

    fn set_widget_contents(&mut self, widget: WidgetId, contents: &[Option<SlotItem>]) -> Result<()> {
        let entry = self
            .widgets
            .get_mut(&widget)
            .ok_or(PanelError::UnknownWidget(widget))?;
        if contents.len() != entry.slots.len() {
            return Err(PanelError::Host(format!(
                "content length {} does not match widget size {}",
                contents.len(),
                entry.slots.len()
            )));
        }
        entry.slots = contents.to_vec();
        entry.writes += 1;
        Ok(())
    }

    fn viewers(&self, widget: WidgetId) -> Vec<ViewerId> {
        let mut viewers: Vec<_> = self
            .views
            .iter()
            .filter(|(_, open)| **open == widget)
            .map(|(viewer, _)| *viewer)
            .collect();
        viewers.sort();
        viewers
    }

    fn is_online(&self, viewer: ViewerId) -> bool {
        self.online.contains(&viewer)
    }

    fn play_sound(&mut self, viewer: ViewerId, cue: &SoundCue) {
        self.sounds.push((viewer, cue.clone()));
    }

    fn now_epoch_ms(&self) -> i64 {
        self.clock_ms
    }

    fn current_tick(&self) -> u64 {
        self.tick
    }

    fn is_authoritative_context(&self) -> bool {
        self.authoritative
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        self.take_events()
    }

    fn subscribe(&mut self, widget: WidgetId) -> Subscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(id, widget);
        Subscription { id, widget }
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscriptions.remove(&subscription.id);
    }

    fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.subscriptions.get(&subscription.id) == Some(&subscription.widget)
    }
}
