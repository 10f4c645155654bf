//! Session management core module.
//!
//! This module provides the records a broker keeps about its sessions and
//! the client/backend connections made inside them.

/// Submodule for connection records.
pub mod connection;
/// Submodule for the connection repository adapter.
pub mod repository;
/// Submodule for session data structures.
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Connection, CONNECTION_PREFIX, DEFAULT_CONNECTION_TABLE_NAME};
pub use repository::ConnectionRepository;
pub use session::Session;
