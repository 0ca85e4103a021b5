//! Core type definitions used across the BaseKit workspace.

pub mod pagination;
pub mod specs;
pub mod sorting;
pub mod value;

pub use pagination::Page;
pub use specs::{CursorDirection, RangeFilter, Specification};
pub use sorting::{SortDirection, SortField};
pub use value::FieldValue;
