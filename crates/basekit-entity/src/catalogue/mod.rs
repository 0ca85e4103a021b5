//! User catalogue entity.

pub mod model;

pub use model::UserCatalogue;
