//! Connection records.
//!
//! A `Connection` pairs one client address/port with one backend address/port
//! inside a session. It is a record of that pairing, never the live socket.

use crate::error_handling::types::DbError;
use crate::storage::db_entities::{port_from_column, ConnectionRow};
use crate::storage::resource::{Identifiable, Resource, TableNamed};
use sea_orm::{QueryResult, Value};
use serde::{Deserialize, Serialize};

/// Prefix of every connection public id.
pub const CONNECTION_PREFIX: &str = "conn";

/// Relation connections are stored in unless overridden.
pub const DEFAULT_CONNECTION_TABLE_NAME: &str = "session_connection";

const COLUMNS: &[&str] = &[
    "session_id",
    "client_address",
    "client_port",
    "backend_address",
    "backend_port",
];

/// A client/backend socket pairing belonging to a session.
///
/// # Fields Overview
///
/// - `public_id`: unique id, empty until the caller assigns one
/// - `session_id`: public id of the parent session
/// - `client_address` / `client_port`: where the client connected from
/// - `backend_address` / `backend_port`: where the session is forwarded to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub public_id: String,
    pub session_id: String,
    pub client_address: String,
    pub client_port: u32,
    pub backend_address: String,
    pub backend_port: u32,
    #[serde(skip)]
    table_name: Option<String>,
}

impl Connection {
    /// Builds a validated connection with no public id.
    ///
    /// Fields are checked in argument order and the first empty or zero one
    /// is reported as `DbError::InvalidParameter`.
    pub fn new(
        session_id: &str,
        client_address: &str,
        client_port: u32,
        backend_address: &str,
        backend_port: u32,
    ) -> Result<Self, DbError> {
        if session_id.is_empty() {
            return Err(DbError::invalid("missing session id"));
        }
        if client_address.is_empty() {
            return Err(DbError::invalid("missing client address"));
        }
        if client_port == 0 {
            return Err(DbError::invalid("missing client port"));
        }
        if backend_address.is_empty() {
            return Err(DbError::invalid("missing backend address"));
        }
        if backend_port == 0 {
            return Err(DbError::invalid("missing backend port"));
        }
        Ok(Self {
            session_id: session_id.to_string(),
            client_address: client_address.to_string(),
            client_port,
            backend_address: backend_address.to_string(),
            backend_port,
            ..Default::default()
        })
    }

    /// An empty connection used to carry a public id into lookups and deletes.
    pub fn alloc() -> Self {
        Self::default()
    }

    /// Sets the public id. It can only be set once.
    pub fn assign_public_id(&mut self, id: impl Into<String>) -> Result<(), DbError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DbError::invalid("missing public id"));
        }
        if !self.public_id.is_empty() {
            return Err(DbError::invalid(format!(
                "public id already assigned: {}",
                self.public_id
            )));
        }
        self.public_id = id;
        Ok(())
    }
}

impl Identifiable for Connection {
    fn public_id(&self) -> &str {
        &self.public_id
    }
}

impl TableNamed for Connection {
    fn table_name(&self) -> &str {
        self.table_name
            .as_deref()
            .unwrap_or(DEFAULT_CONNECTION_TABLE_NAME)
    }

    fn set_table_name(&mut self, name: &str) {
        self.table_name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
    }
}

impl Resource for Connection {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.session_id.clone()),
            Value::from(self.client_address.clone()),
            Value::from(i64::from(self.client_port)),
            Value::from(self.backend_address.clone()),
            Value::from(i64::from(self.backend_port)),
        ]
    }

    fn load(&mut self, row: &QueryResult) -> Result<(), DbError> {
        let row = ConnectionRow::from_row(row)?;
        let client_port = port_from_column(row.client_port, "client_port")?;
        let backend_port = port_from_column(row.backend_port, "backend_port")?;

        self.public_id = row.public_id;
        self.session_id = row.session_id;
        self.client_address = row.client_address;
        self.client_port = client_port;
        self.backend_address = row.backend_address;
        self.backend_port = backend_port;
        Ok(())
    }
}
