//! Grid geometry for slot panels.

pub mod grid;

pub use grid::{COLUMNS, MAX_SLOTS, MIN_SLOTS, SlotGrid, inv_size_for_count};
