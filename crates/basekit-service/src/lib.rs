//! # basekit-service
//!
//! The generic service layer. `BaseService<T>` wraps a repository and
//! runs before/after lifecycle hooks around single-record mutations.
//! Services follow constructor injection — dependencies are provided at
//! construction time via `Arc` references.

pub mod base;

pub use base::BaseService;
