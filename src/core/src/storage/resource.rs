//! Traits every persisted record implements.
//!
//! The storage backends are written once against `Resource` instead of once per
//! record type. A record names its relation (`TableNamed`), its key
//! (`Identifiable`) and how its remaining fields map onto columns.

use crate::error_handling::types::DbError;
use sea_orm::{QueryResult, Value};

/// Name of the primary key column shared by every relation.
pub const PUBLIC_ID_COLUMN: &str = "public_id";

pub trait Identifiable {
    fn public_id(&self) -> &str;
}

pub trait TableNamed {
    /// The relation this instance reads from and writes to.
    fn table_name(&self) -> &str;

    /// Overrides the relation for this instance. An empty name resets it to
    /// the type's default.
    fn set_table_name(&mut self, name: &str);
}

pub trait Resource: Identifiable + TableNamed {
    /// Non-key columns, in the same order as `values`.
    fn columns(&self) -> &'static [&'static str];

    fn values(&self) -> Vec<Value>;

    /// Replaces the non-key fields with the ones found in `row`.
    ///
    /// Implementations must decode the whole row before touching `self`, so a
    /// failure leaves the record as it was.
    fn load(&mut self, row: &QueryResult) -> Result<(), DbError>;
}
