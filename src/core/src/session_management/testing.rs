//! Fixtures for tests that need stored sessions and connections.

use crate::session_management::connection::{Connection, CONNECTION_PREFIX};
use crate::session_management::session::{Session, SESSION_PREFIX};
use crate::storage::context::RequestContext;
use crate::storage::public_id::new_public_id;
use crate::storage::storage_trait::Writer;

/// Stores a session for the `ssh` service and returns it.
pub fn test_session(writer: &dyn Writer) -> Session {
    let mut session = Session::new("ssh").unwrap();
    session.public_id = new_public_id(SESSION_PREFIX).unwrap();
    writer
        .create(&RequestContext::background(), &session)
        .unwrap();
    session
}

/// Stores a connection of `session_id` and returns it.
pub fn test_connection(
    writer: &dyn Writer,
    session_id: &str,
    client_address: &str,
    client_port: u32,
    backend_address: &str,
    backend_port: u32,
) -> Connection {
    let mut conn = Connection::new(
        session_id,
        client_address,
        client_port,
        backend_address,
        backend_port,
    )
    .unwrap();
    conn.assign_public_id(new_public_id(CONNECTION_PREFIX).unwrap())
        .unwrap();
    writer
        .create(&RequestContext::background(), &conn)
        .unwrap();
    conn
}
