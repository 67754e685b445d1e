//! Interactive slot icons and their gesture dispatch tables.

mod builder;
mod core;

pub use self::builder::IconBuilder;
pub use self::core::{ActionFn, Binding, Icon, action};
