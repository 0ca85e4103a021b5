//! Traits shared across the BaseKit workspace.

pub mod hooks;
pub mod record;

pub use hooks::{Hooks, NoHooks};
pub use record::{Record, RelationDef};
