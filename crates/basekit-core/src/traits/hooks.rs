//! Lifecycle hooks for the generic service layer.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::FieldValue;

/// Before/after callbacks around single-record mutations.
///
/// Every method defaults to a no-op, so a concrete service only overrides
/// the points it cares about. Bulk operations deliberately bypass hooks.
#[async_trait]
pub trait Hooks<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Runs before a record is created; an error aborts the create.
    async fn before_create(&self, _record: &T) -> AppResult<()> {
        Ok(())
    }

    /// Runs after a record was created. Note: the row is already inserted
    /// at this point unless the caller wrapped the call in a transaction.
    async fn after_create(&self, _record: &T) -> AppResult<()> {
        Ok(())
    }

    /// Runs before a record is updated; an error aborts the update.
    async fn before_update(&self, _id: &FieldValue, _record: &T) -> AppResult<()> {
        Ok(())
    }

    /// Runs after a record was updated.
    async fn after_update(&self, _id: &FieldValue, _record: &T) -> AppResult<()> {
        Ok(())
    }

    /// Runs before a record is deleted; an error aborts the delete.
    async fn before_delete(&self, _id: &FieldValue) -> AppResult<()> {
        Ok(())
    }

    /// Runs after a record was deleted.
    async fn after_delete(&self, _id: &FieldValue) -> AppResult<()> {
        Ok(())
    }
}

/// The default hook implementation: every callback is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

#[async_trait]
impl<T> Hooks<T> for NoHooks where T: Send + Sync {}
