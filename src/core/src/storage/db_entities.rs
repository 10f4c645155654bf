//! Row models used by the database storage backend.
//!
//! These structs map to the SQLite tables created by `database_storage`:
//! - `session`: the parent session records
//! - `session_connection`: client/backend pairings of a session, and any
//!   alternate relation created with the same layout

use crate::error_handling::types::DbError;
use log::error;
use sea_orm::{FromQueryResult, QueryResult};

/// Connection row. Ports are stored as SQLite integers.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct ConnectionRow {
    pub public_id: String,
    pub session_id: String,
    pub client_address: String,
    pub client_port: i64,
    pub backend_address: String,
    pub backend_port: i64,
}

impl ConnectionRow {
    pub fn from_row(row: &QueryResult) -> Result<Self, DbError> {
        Self::from_query_result(row, "").map_err(|e| {
            error!("Failed to decode connection row: {}", e);
            DbError::ReadFailed(e.to_string())
        })
    }
}

/// Session row. `start_time` is an RFC3339 timestamp.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct SessionRow {
    pub public_id: String,
    pub service_name: String,
    pub start_time: String,
}

impl SessionRow {
    pub fn from_row(row: &QueryResult) -> Result<Self, DbError> {
        Self::from_query_result(row, "").map_err(|e| {
            error!("Failed to decode session row: {}", e);
            DbError::ReadFailed(e.to_string())
        })
    }
}

/// Converts a stored port back to `u32`, rejecting anything out of range.
pub fn port_from_column(value: i64, column: &str) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| {
        error!("Stored {} {} does not fit a port", column, value);
        DbError::ReadFailed(format!("{} out of range: {}", column, value))
    })
}
