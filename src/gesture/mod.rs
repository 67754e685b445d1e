//! Gesture classification for slot clicks.
//!
//! `GestureType` is the input class a dispatch table is keyed on; `RawAction`
//! is the host's classification of what the click would do to the item
//! stacks if the host handled it by itself.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    WindowBorderLeft,
    WindowBorderRight,
    Middle,
    NumberKey,
    DoubleClick,
    Drop,
    ControlDrop,
    Creative,
    SwapOffhand,
    Unknown,
}

impl GestureType {
    pub const ALL: [GestureType; 14] = [
        GestureType::Left,
        GestureType::ShiftLeft,
        GestureType::Right,
        GestureType::ShiftRight,
        GestureType::WindowBorderLeft,
        GestureType::WindowBorderRight,
        GestureType::Middle,
        GestureType::NumberKey,
        GestureType::DoubleClick,
        GestureType::Drop,
        GestureType::ControlDrop,
        GestureType::Creative,
        GestureType::SwapOffhand,
        GestureType::Unknown,
    ];

    pub fn is_shift(self) -> bool {
        matches!(self, GestureType::ShiftLeft | GestureType::ShiftRight)
    }

    pub fn is_keyboard(self) -> bool {
        matches!(
            self,
            GestureType::NumberKey
                | GestureType::Drop
                | GestureType::ControlDrop
                | GestureType::SwapOffhand
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GestureType::Left => "left",
            GestureType::ShiftLeft => "shift_left",
            GestureType::Right => "right",
            GestureType::ShiftRight => "shift_right",
            GestureType::WindowBorderLeft => "window_border_left",
            GestureType::WindowBorderRight => "window_border_right",
            GestureType::Middle => "middle",
            GestureType::NumberKey => "number_key",
            GestureType::DoubleClick => "double_click",
            GestureType::Drop => "drop",
            GestureType::ControlDrop => "control_drop",
            GestureType::Creative => "creative",
            GestureType::SwapOffhand => "swap_offhand",
            GestureType::Unknown => "unknown",
        }
    }
}

/// Ordered set of gesture types bound to one action.
pub type GestureSet = BTreeSet<GestureType>;

pub fn gesture_set(gestures: &[GestureType]) -> GestureSet {
    gestures.iter().copied().collect()
}

/// Host-side classification of the stack movement a click would trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAction {
    Nothing,
    PickupAll,
    PickupSome,
    PickupHalf,
    PickupOne,
    PlaceAll,
    PlaceSome,
    PlaceOne,
    SwapWithCursor,
    DropAllCursor,
    DropOneCursor,
    DropAllSlot,
    DropOneSlot,
    MoveToOtherInventory,
    HotbarMoveAndReadd,
    HotbarSwap,
    CloneStack,
    CollectToCursor,
    Unknown,
}

impl RawAction {
    /// Actions a slot-grid panel never supports, whatever its options.
    pub fn is_always_denied(self) -> bool {
        matches!(
            self,
            RawAction::CloneStack | RawAction::CollectToCursor | RawAction::Unknown
        )
    }

    pub fn is_container_move(self) -> bool {
        matches!(self, RawAction::MoveToOtherInventory)
    }
}
