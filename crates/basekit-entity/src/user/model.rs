//! User entity model.

use basekit_core::traits::Record;
use basekit_core::types::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user.
///
/// Users are hard-deleted: the table has no soft-delete marker, so
/// `Record::soft_delete_column` stays at its `None` default.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password: String,
    /// Catalogue this user belongs to, if any.
    pub catalogue_id: Option<i64>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            catalogue_id: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Record for User {
    fn table() -> &'static str {
        "users"
    }

    fn id(&self) -> FieldValue {
        FieldValue::Int(self.id)
    }

    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("email", self.email.clone().into()),
            ("password", self.password.clone().into()),
            ("catalogue_id", self.catalogue_id.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ]
    }
}
