//! Storage subsystem
//!
//! This module provides the generic persistence primitives connection records
//! are stored through, and their SQLite implementation.
//!
//! Components:
//! - `resource`: the `Identifiable`, `TableNamed` and `Resource` traits records implement.
//! - `storage_trait`: the `Writer` trait defining a uniform create/delete/lookup API.
//! - `context`: the request context passed down to every call.
//! - `public_id`: generation of prefixed public identifiers.
//! - `database_storage`: SQLite implementation using SeaORM.
//! - `db_entities`: row models for the database backend.

pub mod context;
pub mod database_storage;
pub mod db_entities;
pub mod public_id;
pub mod resource;
pub mod storage_trait;

pub use context::RequestContext;
pub use database_storage::DatabaseStorage;
pub use public_id::new_public_id;
pub use resource::{Identifiable, Resource, TableNamed};
pub use storage_trait::Writer;
