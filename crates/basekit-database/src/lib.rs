//! # basekit-database
//!
//! PostgreSQL connection management and the generic repository.
//!
//! The repository is generic over any [`basekit_core::traits::Record`]
//! type and builds every statement through `sqlx::QueryBuilder`: field
//! names are validated against an identifier whitelist before entering
//! SQL text, and values are always bound parameters.

pub mod connection;
pub mod fields;
pub mod migration;
pub mod repository;

mod query;

pub use connection::DatabasePool;
pub use repository::Repository;
