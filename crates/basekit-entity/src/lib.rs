//! # basekit-entity
//!
//! Domain entity models for BaseKit. Every struct in this crate represents
//! a database table row. All entities derive `Debug`, `Clone`, `Serialize`,
//! `Deserialize`, and `sqlx::FromRow`, carry a container-level
//! `#[serde(default)]` so projected reads can decode with missing columns,
//! and implement [`basekit_core::traits::Record`] to plug into the generic
//! repository.

pub mod catalogue;
pub mod user;

pub use catalogue::UserCatalogue;
pub use user::User;
