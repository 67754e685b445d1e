use blake3::Hash;

use crate::error::{PanelError, Result};
use crate::host::{Host, SlotContents, SlotIndex, ViewerId, WidgetId};
use crate::item::SlotItem;

/// Outcome of a [`PanelBuffer::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReport {
    pub fingerprint: Hash,
    /// False when the committed contents matched the previous commit.
    pub changed: bool,
}

/// Shadow copy of a widget's slots.
///
/// Every write lands in the shadow; the host widget only changes on
/// [`commit`](Self::commit), which copies the whole shadow across in one call.
/// Content queries read the shadow. Viewer enumeration asks the host, since
/// viewers belong to what is actually open.
#[derive(Debug, Clone)]
pub struct PanelBuffer {
    widget: WidgetId,
    shadow: SlotContents,
    last_commit: Option<Hash>,
}

impl PanelBuffer {
    pub fn new(widget: WidgetId, size: usize) -> Self {
        Self {
            widget,
            shadow: vec![None; size],
            last_commit: None,
        }
    }

    /// Wrap an existing widget, seeding the shadow from its current contents.
    pub fn from_widget(host: &dyn Host, widget: WidgetId) -> Result<Self> {
        let shadow = host.widget_contents(widget)?;
        Ok(Self {
            widget,
            shadow,
            last_commit: None,
        })
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn size(&self) -> usize {
        self.shadow.len()
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&SlotItem> {
        self.shadow.get(slot).and_then(Option::as_ref)
    }

    pub fn set(&mut self, slot: SlotIndex, item: Option<SlotItem>) -> Result<()> {
        let size = self.size();
        let entry = self
            .shadow
            .get_mut(slot)
            .ok_or(PanelError::SlotOutOfRange { slot, size })?;
        *entry = item;
        Ok(())
    }

    pub fn clear(&mut self, slot: SlotIndex) -> Result<()> {
        self.set(slot, None)
    }

    pub fn clear_all(&mut self) {
        self.shadow.iter_mut().for_each(|entry| *entry = None);
    }

    pub fn contents(&self) -> &[Option<SlotItem>] {
        &self.shadow
    }

    pub fn contains(&self, item: &SlotItem) -> bool {
        self.first(item).is_some()
    }

    pub fn contains_material(&self, key: &str) -> bool {
        self.shadow.iter().flatten().any(|item| item.is_material(key))
    }

    pub fn first(&self, item: &SlotItem) -> Option<SlotIndex> {
        self.shadow
            .iter()
            .position(|entry| entry.as_ref() == Some(item))
    }

    pub fn first_empty(&self) -> Option<SlotIndex> {
        self.shadow.iter().position(Option::is_none)
    }

    pub fn is_empty(&self) -> bool {
        self.shadow.iter().all(Option::is_none)
    }

    pub fn all_of_material(&self, key: &str) -> Vec<(SlotIndex, &SlotItem)> {
        self.shadow
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|item| (slot, item)))
            .filter(|(_, item)| item.is_material(key))
            .collect()
    }

    pub fn viewers(&self, host: &dyn Host) -> Vec<ViewerId> {
        host.viewers(self.widget)
    }

    /// Hash of the shadow contents.
    pub fn fingerprint(&self) -> Result<Hash> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, &self.shadow)?;
        Ok(hasher.finalize())
    }

    /// Copy the whole shadow into the host widget.
    pub fn commit(&mut self, host: &mut dyn Host) -> Result<CommitReport> {
        let fingerprint = self.fingerprint()?;
        host.set_widget_contents(self.widget, &self.shadow)?;
        let changed = self.last_commit != Some(fingerprint);
        self.last_commit = Some(fingerprint);
        Ok(CommitReport {
            fingerprint,
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimHost;

    fn setup() -> (SimHost, PanelBuffer) {
        let mut host = SimHost::new();
        let widget = host.create_widget("test", 18).unwrap();
        (host, PanelBuffer::new(widget, 18))
    }

    #[test]
    fn writes_stay_in_shadow_until_commit() {
        let (mut host, mut buffer) = setup();
        buffer.set(4, Some(SlotItem::of("emerald"))).unwrap();

        assert!(buffer.get(4).unwrap().is_material("emerald"));
        assert!(host.slot(buffer.widget(), 4).is_none());

        buffer.commit(&mut host).unwrap();
        assert!(host.slot(buffer.widget(), 4).unwrap().is_material("emerald"));
    }

    #[test]
    fn out_of_range_write_is_an_error() {
        let (_, mut buffer) = setup();
        let err = buffer.set(18, None).unwrap_err();
        assert!(matches!(err, PanelError::SlotOutOfRange { slot: 18, size: 18 }));
    }

    #[test]
    fn queries_read_the_shadow() {
        let (mut host, mut buffer) = setup();
        let widget = buffer.widget();
        host.poke_slot(widget, 0, Some(SlotItem::of("dirt")));

        assert!(buffer.is_empty());
        assert_eq!(buffer.first_empty(), Some(0));

        buffer.set(0, Some(SlotItem::of("gold"))).unwrap();
        buffer.set(3, Some(SlotItem::of("gold"))).unwrap();
        assert!(!buffer.contains_material("dirt"));
        assert_eq!(buffer.first(&SlotItem::of("gold")), Some(0));
        assert_eq!(buffer.first_empty(), Some(1));
        assert_eq!(buffer.all_of_material("gold").len(), 2);
    }

    #[test]
    fn repeated_commit_reports_unchanged() {
        let (mut host, mut buffer) = setup();
        buffer.set(1, Some(SlotItem::of("stone"))).unwrap();
        assert!(buffer.commit(&mut host).unwrap().changed);
        assert!(!buffer.commit(&mut host).unwrap().changed);
        assert_eq!(host.write_count(buffer.widget()), 2);
    }

    #[test]
    fn from_widget_seeds_shadow() {
        let mut host = SimHost::new();
        let widget = host.create_widget("chest", 27).unwrap();
        host.poke_slot(widget, 2, Some(SlotItem::of("apple")));
        let buffer = PanelBuffer::from_widget(&host, widget).unwrap();
        assert_eq!(buffer.size(), 27);
        assert!(buffer.get(2).unwrap().is_material("apple"));
    }
}
