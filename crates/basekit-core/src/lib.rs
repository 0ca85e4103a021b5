//! # basekit-core
//!
//! Core crate for BaseKit. Contains traits, configuration schemas,
//! the shared specification/pagination/sorting types, the token-bucket
//! rate limiter, and the unified error system.
//!
//! This crate has **no** internal dependencies on other BaseKit crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod ratelimit;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
