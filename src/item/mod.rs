//! Minimal slot item model.
//!
//! Items are plain values: the framework copies them between the shadow
//! buffer and the host widget and never inspects them beyond equality.

mod core;

pub use self::core::{Material, SlotItem, StyledText, TextColor, spacer};
