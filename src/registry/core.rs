use std::collections::BTreeMap;

use crate::buffer::PanelBuffer;
use crate::error::Result;
use crate::host::SlotIndex;
use crate::icon::Icon;
use crate::overlay::ErrorOverlay;

/// Icons and overlays keyed by slot, iterated in slot order.
#[derive(Debug, Default, Clone)]
pub struct SlotRegistry {
    icons: BTreeMap<SlotIndex, Icon>,
    overlays: BTreeMap<SlotIndex, ErrorOverlay>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or unbind the icon for `slot`, returning the previous one.
    pub fn set_icon(&mut self, slot: SlotIndex, icon: Option<Icon>) -> Option<Icon> {
        match icon {
            Some(icon) => self.icons.insert(slot, icon),
            None => self.icons.remove(&slot),
        }
    }

    pub fn icon(&self, slot: SlotIndex) -> Option<&Icon> {
        self.icons.get(&slot)
    }

    pub fn icons(&self) -> impl Iterator<Item = (SlotIndex, &Icon)> {
        self.icons.iter().map(|(slot, icon)| (*slot, icon))
    }

    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }

    /// Store an overlay, replacing (and restarting) any overlay on the slot.
    pub fn put_overlay(&mut self, slot: SlotIndex, overlay: ErrorOverlay) -> Option<ErrorOverlay> {
        self.overlays.insert(slot, overlay)
    }

    pub fn overlay(&self, slot: SlotIndex) -> Option<&ErrorOverlay> {
        self.overlays.get(&slot)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Drop overlays whose deadline is at or before `now_ms`.
    pub fn sweep_expired(&mut self, now_ms: i64) -> Vec<SlotIndex> {
        let expired: Vec<_> = self
            .overlays
            .iter()
            .filter(|(_, overlay)| overlay.is_expired(now_ms))
            .map(|(slot, _)| *slot)
            .collect();
        for slot in &expired {
            self.overlays.remove(slot);
        }
        expired
    }

    /// Write every icon, then every overlay, into the shadow buffer.
    pub fn render_into(&self, buffer: &mut PanelBuffer) -> Result<()> {
        for (slot, icon) in &self.icons {
            buffer.set(*slot, Some(icon.item().clone()))?;
        }
        for (slot, overlay) in &self.overlays {
            buffer.set(*slot, Some(overlay.to_item()))?;
        }
        Ok(())
    }
}
