//! The record-shape descriptor implemented by every persistable type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::FieldValue;

/// A relation that can be eager-loaded alongside a record.
///
/// Each requested relation becomes one separate fetch
/// (`WHERE foreign_key IN (parent ids)`) — never a join, to avoid
/// duplication fan-out on the parent rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    /// Name callers use in `Specification::relations`.
    pub name: &'static str,
    /// Table holding the related rows.
    pub table: &'static str,
    /// Column on the related table referencing the parent's identity.
    pub foreign_key: &'static str,
}

/// Shape descriptor binding a concrete record type to the generic
/// repository: table name, identity column, optional soft-delete marker,
/// and the column/value pairs of an instance.
///
/// `Default` + the serde bounds exist for the projection decode path:
/// projected rows deserialize with container-level defaults, so columns
/// left out of the projection take their zero value.
pub trait Record:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// The table this record maps to.
    fn table() -> &'static str;

    /// The identity column.
    fn id_column() -> &'static str {
        "id"
    }

    /// The soft-delete marker column, if the record is soft-deletable.
    ///
    /// When present, deletes set the marker instead of removing the row,
    /// every read scopes to `marker IS NULL`, and `restore_by_id` clears
    /// it again.
    fn soft_delete_column() -> Option<&'static str> {
        None
    }

    /// The identity value of this instance.
    fn id(&self) -> FieldValue;

    /// All column/value pairs of this instance, excluding the identity
    /// column and the soft-delete marker (the marker is managed solely by
    /// delete/restore).
    fn values(&self) -> Vec<(&'static str, FieldValue)>;

    /// Relations that may be eager-loaded for this record.
    fn relations() -> &'static [RelationDef] {
        &[]
    }

    /// Look up a relation by name.
    fn relation(name: &str) -> Option<&'static RelationDef> {
        Self::relations().iter().find(|r| r.name == name)
    }
}
