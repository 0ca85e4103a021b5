//! User catalogue entity model.

use basekit_core::traits::{Record, RelationDef};
use basekit_core::types::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named grouping of users.
///
/// Catalogues are soft-deletable: deletes stamp `deleted_at` and every
/// read scopes to `deleted_at IS NULL` until the row is restored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct UserCatalogue {
    /// Unique catalogue identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Role granted to members of this catalogue.
    pub role: String,
    /// Publication state (0 = draft, 1 = published).
    pub publish: i64,
    /// When the catalogue was created.
    pub created_at: DateTime<Utc>,
    /// When the catalogue was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Managed by delete/restore, never set directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Default for UserCatalogue {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            slug: String::new(),
            description: None,
            role: String::new(),
            publish: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            deleted_at: None,
        }
    }
}

impl Record for UserCatalogue {
    fn table() -> &'static str {
        "user_catalogues"
    }

    fn soft_delete_column() -> Option<&'static str> {
        Some("deleted_at")
    }

    fn id(&self) -> FieldValue {
        FieldValue::Int(self.id)
    }

    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        // deleted_at is excluded: only delete/restore touch the marker.
        vec![
            ("name", self.name.clone().into()),
            ("slug", self.slug.clone().into()),
            ("description", self.description.clone().into()),
            ("role", self.role.clone().into()),
            ("publish", self.publish.into()),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
        ]
    }

    fn relations() -> &'static [RelationDef] {
        &[RelationDef {
            name: "users",
            table: "users",
            foreign_key: "catalogue_id",
        }]
    }
}
