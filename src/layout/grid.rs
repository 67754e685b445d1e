//! Slot grid geometry.
//!
//! Panels are rows of nine slots, between one and six rows tall. Requested
//! sizes are normalized with [`inv_size_for_count`]; [`SlotGrid`] converts
//! between slot indices and `(row, column)` positions.
//!
//! # Example
//! ```
//! use slotgrid::layout::grid::{SlotGrid, inv_size_for_count};
//!
//! assert_eq!(inv_size_for_count(10), 18);
//!
//! let grid = SlotGrid::for_count(27);
//! assert_eq!(grid.rows(), 3);
//! assert_eq!(grid.slot_at(1, 4), Some(13));
//! assert_eq!(grid.position(13), Some((1, 4)));
//! ```

use crate::host::SlotIndex;

/// Slots per row.
pub const COLUMNS: usize = 9;

pub const MIN_SLOTS: usize = COLUMNS;

pub const MAX_SLOTS: usize = COLUMNS * 6;

/// Round `count` up to a whole number of rows, clamped to `[9, 54]`.
pub fn inv_size_for_count(count: i64) -> usize {
    if count <= 0 {
        return MIN_SLOTS;
    }
    let columns = COLUMNS as i64;
    let rows = count / columns + i64::from(count % columns > 0);
    let rows = rows.min((MAX_SLOTS / COLUMNS) as i64) as usize;
    (rows * COLUMNS).max(MIN_SLOTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    rows: usize,
}

impl SlotGrid {
    /// Grid for a requested slot count, normalized.
    pub fn for_count(count: i64) -> Self {
        Self::for_size(inv_size_for_count(count))
    }

    /// Grid for an already normalized size. Partial rows round up.
    pub fn for_size(size: usize) -> Self {
        Self {
            rows: size.div_ceil(COLUMNS).max(1),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn size(&self) -> usize {
        self.rows * COLUMNS
    }

    pub fn slot_at(&self, row: usize, col: usize) -> Option<SlotIndex> {
        (row < self.rows && col < COLUMNS).then_some(row * COLUMNS + col)
    }

    pub fn position(&self, slot: SlotIndex) -> Option<(usize, usize)> {
        (slot < self.size()).then_some((slot / COLUMNS, slot % COLUMNS))
    }

    pub fn row(&self, row: usize) -> Vec<SlotIndex> {
        (0..COLUMNS).filter_map(|col| self.slot_at(row, col)).collect()
    }

    /// Slots on the outer edge, in ascending order.
    pub fn border(&self) -> Vec<SlotIndex> {
        (0..self.size())
            .filter(|slot| {
                let (row, col) = (slot / COLUMNS, slot % COLUMNS);
                row == 0 || row + 1 == self.rows || col == 0 || col + 1 == COLUMNS
            })
            .collect()
    }
}
