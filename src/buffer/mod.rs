//! Double-buffered proxy over a host widget.

mod core;

pub use self::core::{CommitReport, PanelBuffer};
