//! Text layout helpers used when rendering item lore.

mod core;

pub use self::core::{DEFAULT_WRAP_WIDTH, wrap_words};
