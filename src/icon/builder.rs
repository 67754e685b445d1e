use std::sync::Arc;

use crate::error::{PanelError, Result};
use crate::gesture::{GestureSet, GestureType, gesture_set};
use crate::host::{SlotIndex, ViewerId};
use crate::item::SlotItem;

use super::core::{ActionFn, Binding, Icon};

/// Fluent accumulator for an [`Icon`]'s dispatch list.
///
/// Every helper goes through [`IconBuilder::on_gestures`], which refuses a
/// gesture type that is already bound. `build` copies the list, so an icon is
/// never affected by later use of the builder.
#[derive(Clone)]
pub struct IconBuilder {
    item: SlotItem,
    bindings: Vec<Binding>,
}

impl IconBuilder {
    pub fn new(item: SlotItem) -> Self {
        Self {
            item,
            bindings: Vec::new(),
        }
    }

    /// Start from an existing icon's item and bindings.
    pub fn from_icon(icon: &Icon) -> Self {
        Self {
            item: icon.item().clone(),
            bindings: icon.bindings().to_vec(),
        }
    }

    pub fn item(mut self, item: SlotItem) -> Self {
        self.item = item;
        self
    }

    /// Bind `f` to the primary click, plus shift-click when `include_shift`.
    /// Double click is always included.
    pub fn on_left_click<F>(self, f: F, include_shift: bool) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        if include_shift {
            self.on_gestures(
                &[
                    GestureType::Left,
                    GestureType::ShiftLeft,
                    GestureType::DoubleClick,
                ],
                f,
            )
        } else {
            self.on_gestures(&[GestureType::Left, GestureType::DoubleClick], f)
        }
    }

    pub fn on_right_click<F>(self, f: F, include_shift: bool) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        if include_shift {
            self.on_gestures(&[GestureType::Right, GestureType::ShiftRight], f)
        } else {
            self.on_gestures(&[GestureType::Right], f)
        }
    }

    pub fn on_shift_click<F>(self, f: F) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        self.on_gestures(&[GestureType::ShiftLeft, GestureType::ShiftRight], f)
    }

    /// Number keys and both drop keys.
    pub fn on_keyboard_click<F>(self, f: F) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        self.on_gestures(
            &[
                GestureType::NumberKey,
                GestureType::Drop,
                GestureType::ControlDrop,
            ],
            f,
        )
    }

    pub fn on_creative_click<F>(self, f: F) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        self.on_gestures(&[GestureType::Creative, GestureType::Middle], f)
    }

    /// Bind `f` to every gesture type. Must be the only binding.
    pub fn on_any_click<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        if !self.bindings.is_empty() {
            return Err(PanelError::CatchAllConflict);
        }
        self.bindings.push(Binding {
            gestures: gesture_set(&GestureType::ALL),
            action: Arc::new(f),
        });
        Ok(self)
    }

    pub fn on_gestures<F>(self, gestures: &[GestureType], f: F) -> Result<Self>
    where
        F: Fn(ViewerId, SlotIndex) -> Option<String> + Send + Sync + 'static,
    {
        self.add_action(gesture_set(gestures), Arc::new(f))
    }

    /// Register `action` for `gestures`, failing if any of them is taken.
    pub fn add_action(mut self, gestures: GestureSet, action: ActionFn) -> Result<Self> {
        if self.is_catch_all() {
            return Err(PanelError::CatchAllConflict);
        }
        for binding in &self.bindings {
            if let Some(gesture) = binding.gestures.intersection(&gestures).next() {
                return Err(PanelError::GestureConflict { gesture: *gesture });
            }
        }
        self.bindings.push(Binding { gestures, action });
        Ok(self)
    }

    pub fn build(&self) -> Icon {
        Icon::from_parts(self.item.clone(), self.bindings.clone())
    }

    fn is_catch_all(&self) -> bool {
        self.bindings
            .first()
            .is_some_and(|binding| binding.gestures.len() == GestureType::ALL.len())
    }
}
