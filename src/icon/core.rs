use std::fmt;
use std::sync::Arc;

use crate::gesture::{GestureSet, GestureType};
use crate::host::{SlotIndex, ViewerId};
use crate::item::SlotItem;

/// Action bound to a set of gestures. Returning `Some(message)` reports a
/// failure that is shown to the viewer as an error overlay.
pub type ActionFn = Arc<dyn Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync>;

/// Wrap a closure as an [`ActionFn`].
pub fn action<F>(f: F) -> ActionFn
where
    F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One entry of an icon's dispatch list.
#[derive(Clone)]
pub struct Binding {
    pub gestures: GestureSet,
    pub action: ActionFn,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("gestures", &self.gestures)
            .finish_non_exhaustive()
    }
}

/// A slot item plus the actions it runs when clicked.
///
/// The bindings' gesture sets are pairwise disjoint; [`IconBuilder`] refuses
/// to produce an icon that breaks this. Lookup scans bindings in
/// registration order and returns the first match, so that order would
/// decide the winner if disjointness were ever relaxed.
///
/// [`IconBuilder`]: crate::icon::IconBuilder
#[derive(Clone, Debug)]
pub struct Icon {
    item: SlotItem,
    bindings: Arc<[Binding]>,
}

impl Icon {
    pub(crate) fn from_parts(item: SlotItem, bindings: Vec<Binding>) -> Self {
        Self {
            item,
            bindings: bindings.into(),
        }
    }

    /// Icon that only displays an item.
    pub fn display(item: SlotItem) -> Self {
        Self::from_parts(item, Vec::new())
    }

    pub fn item(&self) -> &SlotItem {
        &self.item
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn action_for(&self, gesture: GestureType) -> Option<&ActionFn> {
        self.bindings
            .iter()
            .find(|binding| binding.gestures.contains(&gesture))
            .map(|binding| &binding.action)
    }

    pub fn responds_to(&self, gesture: GestureType) -> bool {
        self.action_for(gesture).is_some()
    }
}
