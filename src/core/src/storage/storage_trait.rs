//! Storage Trait
//!
//! This module defines the `Writer` trait, the generic persistence primitives
//! the connection repository is built on.
//!
//! Implementors of this trait are responsible for:
//! - Inserting a record into the relation it names
//! - Deleting a record by public id
//! - Loading a record by public id
//!
//! Every call receives the caller's `RequestContext` and must honour it.

use crate::error_handling::types::DbError;
use crate::storage::context::RequestContext;
use crate::storage::resource::Resource;

pub trait Writer: Send + Sync {
    /// Inserts `resource` into `resource.table_name()`.
    ///
    /// Fails with `DbError::AlreadyExists` when the public id is taken.
    fn create(&self, ctx: &RequestContext, resource: &dyn Resource) -> Result<(), DbError>;

    /// Deletes the row whose public id matches `resource`, ignoring every
    /// other field. Returns the number of rows removed; a missing row is `Ok(0)`.
    fn delete(&self, ctx: &RequestContext, resource: &dyn Resource) -> Result<usize, DbError>;

    /// Loads the row whose public id matches `resource` into it.
    ///
    /// Fails with `DbError::RecordNotFound` when nothing matches.
    fn lookup_by_id(
        &self,
        ctx: &RequestContext,
        resource: &mut dyn Resource,
    ) -> Result<(), DbError>;
}
