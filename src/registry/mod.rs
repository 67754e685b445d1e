//! Per-slot bookkeeping of icons and error overlays.

mod core;

pub use self::core::SlotRegistry;
