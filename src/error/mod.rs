//! Error surface for the panel framework.

mod types;

pub use types::{PanelError, Result};
