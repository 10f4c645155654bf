use crate::error_handling::types::DbError;
use crate::session_management::connection::{Connection, CONNECTION_PREFIX};
use crate::storage::context::RequestContext;
use crate::storage::public_id::new_public_id;
use crate::storage::storage_trait::Writer;
use log::{debug, info};
use std::sync::Arc;

/// Connection operations on top of a generic `Writer`.
///
/// The repository adds nothing to the errors the writer returns. Its own
/// logic is limited to assigning public ids and to the by-id conveniences.
pub struct ConnectionRepository {
    writer: Arc<dyn Writer>,
}

impl ConnectionRepository {
    pub fn new(writer: Arc<dyn Writer>) -> Self {
        Self { writer }
    }

    /// Persists `conn`, which must already carry a public id.
    pub fn create_connection(&self, ctx: &RequestContext, conn: &Connection) -> Result<(), DbError> {
        self.writer.create(ctx, conn)
    }

    /// Deletes by public id. Returns 0 when the connection was already gone.
    pub fn delete_connection(
        &self,
        ctx: &RequestContext,
        conn: &Connection,
    ) -> Result<usize, DbError> {
        self.writer.delete(ctx, conn)
    }

    /// Fills `conn` from the row matching its public id.
    pub fn lookup_connection(
        &self,
        ctx: &RequestContext,
        conn: &mut Connection,
    ) -> Result<(), DbError> {
        self.writer.lookup_by_id(ctx, conn)
    }

    pub fn lookup_connection_by_id(
        &self,
        ctx: &RequestContext,
        public_id: &str,
    ) -> Result<Connection, DbError> {
        let mut conn = Connection::alloc();
        conn.public_id = public_id.to_string();
        self.lookup_connection(ctx, &mut conn)?;
        Ok(conn)
    }

    pub fn delete_connection_by_id(
        &self,
        ctx: &RequestContext,
        public_id: &str,
    ) -> Result<usize, DbError> {
        let mut conn = Connection::alloc();
        conn.public_id = public_id.to_string();
        self.delete_connection(ctx, &conn)
    }

    /// Records a new connection for `session_id`: validates the fields,
    /// assigns a fresh public id and stores it.
    pub fn connect(
        &self,
        ctx: &RequestContext,
        session_id: &str,
        client_address: &str,
        client_port: u32,
        backend_address: &str,
        backend_port: u32,
    ) -> Result<Connection, DbError> {
        let mut conn = Connection::new(
            session_id,
            client_address,
            client_port,
            backend_address,
            backend_port,
        )?;
        conn.assign_public_id(new_public_id(CONNECTION_PREFIX)?)?;
        debug!("Assigned {} to connection of session {}", conn.public_id, session_id);

        self.create_connection(ctx, &conn)?;
        info!(
            "Connection {} recorded: {}:{} -> {}:{}",
            conn.public_id, client_address, client_port, backend_address, backend_port
        );
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::connection::DEFAULT_CONNECTION_TABLE_NAME;
    use crate::session_management::testing::{test_connection, test_session};
    use crate::storage::database_storage::DatabaseStorage;
    use crate::storage::resource::{Identifiable, Resource, TableNamed};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn temp_storage() -> Arc<DatabaseStorage> {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        Box::leak(Box::new(dir));
        Arc::new(DatabaseStorage::new_file(path).unwrap())
    }

    fn ctx() -> RequestContext {
        RequestContext::background()
    }

    // Records which calls reach the writer without storing anything
    #[derive(Default)]
    struct RecordingWriter {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingWriter {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Writer for RecordingWriter {
        fn create(&self, _ctx: &RequestContext, resource: &dyn Resource) -> Result<(), DbError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create {} {}", resource.table_name(), resource.public_id()));
            Ok(())
        }

        fn delete(&self, _ctx: &RequestContext, resource: &dyn Resource) -> Result<usize, DbError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete {}", resource.public_id()));
            Ok(0)
        }

        fn lookup_by_id(
            &self,
            _ctx: &RequestContext,
            resource: &mut dyn Resource,
        ) -> Result<(), DbError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("lookup {}", resource.public_id()));
            Err(DbError::RecordNotFound)
        }
    }

    #[test]
    fn test_create_valid() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);

        let mut conn = Connection::new(&session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222).unwrap();
        conn.assign_public_id(new_public_id(CONNECTION_PREFIX).unwrap()).unwrap();
        repo.create_connection(&ctx(), &conn).unwrap();

        let found = repo.lookup_connection_by_id(&ctx(), &conn.public_id).unwrap();
        assert_eq!(found, conn);
    }

    #[test]
    fn test_create_without_public_id() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);

        let conn = Connection::new(&session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222).unwrap();
        let err = repo.create_connection(&ctx(), &conn).unwrap_err();
        assert!(matches!(err, DbError::InvalidParameter(_)));
    }

    #[test]
    fn test_delete() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);

        struct Case {
            name: &'static str,
            public_id: String,
            want_rows_deleted: usize,
        }
        let cases = vec![
            Case {
                name: "valid",
                public_id: test_connection(&*storage, &session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222)
                    .public_id,
                want_rows_deleted: 1,
            },
            Case {
                name: "bad-id",
                public_id: new_public_id(CONNECTION_PREFIX).unwrap(),
                want_rows_deleted: 0,
            },
        ];

        for case in cases {
            let mut delete_connection = Connection::alloc();
            delete_connection.public_id = case.public_id.clone();
            let deleted = repo.delete_connection(&ctx(), &delete_connection).unwrap();
            assert_eq!(deleted, case.want_rows_deleted, "case {}", case.name);
            if case.want_rows_deleted == 0 {
                continue;
            }

            let mut found = Connection::alloc();
            found.public_id = case.public_id.clone();
            let err = repo.lookup_connection(&ctx(), &mut found).unwrap_err();
            assert_eq!(err, DbError::RecordNotFound, "case {}", case.name);
        }
    }

    #[test]
    fn test_delete_is_idempotent() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);
        let conn = test_connection(&*storage, &session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222);

        assert_eq!(repo.delete_connection_by_id(&ctx(), &conn.public_id).unwrap(), 1);
        assert_eq!(repo.delete_connection_by_id(&ctx(), &conn.public_id).unwrap(), 0);
    }

    #[test]
    fn test_delete_matches_on_public_id_only() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);
        let conn = test_connection(&*storage, &session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222);

        let mut other = Connection::new("s_elsewhere0", "10.1.1.1", 9, "10.2.2.2", 99).unwrap();
        other.public_id = conn.public_id.clone();
        assert_eq!(repo.delete_connection(&ctx(), &other).unwrap(), 1);
    }

    #[test]
    fn test_lookup_not_found_leaves_entity_untouched() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage);

        let mut conn = Connection::alloc();
        conn.public_id = new_public_id(CONNECTION_PREFIX).unwrap();
        conn.client_address = "sentinel".to_string();
        let before = conn.clone();
        assert_eq!(repo.lookup_connection(&ctx(), &mut conn), Err(DbError::RecordNotFound));
        assert_eq!(conn, before);
    }

    #[test]
    fn test_connect_lifecycle() {
        let storage = temp_storage();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);

        let conn = repo
            .connect(&ctx(), &session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222)
            .unwrap();
        assert!(conn.public_id.starts_with("conn_"));

        let mut found = Connection::alloc();
        found.public_id = conn.public_id.clone();
        repo.lookup_connection(&ctx(), &mut found).unwrap();
        assert_eq!(found.session_id, session.public_id);
        assert_eq!(found.client_address, "127.0.0.1");
        assert_eq!(found.client_port, 22);
        assert_eq!(found.backend_address, "127.0.0.1");
        assert_eq!(found.backend_port, 2222);
        assert_eq!(found, conn);

        assert_eq!(repo.delete_connection(&ctx(), &found).unwrap(), 1);
        assert_eq!(
            repo.lookup_connection_by_id(&ctx(), &conn.public_id),
            Err(DbError::RecordNotFound)
        );
    }

    #[test]
    fn test_connect_invalid_never_reaches_writer() {
        let writer = Arc::new(RecordingWriter::default());
        let repo = ConnectionRepository::new(writer.clone());

        let err = repo
            .connect(&ctx(), "", "127.0.0.1", 22, "127.0.0.1", 2222)
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidParameter(_)));
        assert!(writer.calls().is_empty());
    }

    #[test]
    fn test_repository_delegates_to_writer() {
        let writer = Arc::new(RecordingWriter::default());
        let repo = ConnectionRepository::new(writer.clone());

        let conn = repo
            .connect(&ctx(), "s_1234567890", "127.0.0.1", 22, "127.0.0.1", 2222)
            .unwrap();
        assert_eq!(repo.delete_connection_by_id(&ctx(), &conn.public_id).unwrap(), 0);
        assert_eq!(
            repo.lookup_connection_by_id(&ctx(), &conn.public_id),
            Err(DbError::RecordNotFound)
        );

        assert_eq!(
            writer.calls(),
            vec![
                format!("create {} {}", DEFAULT_CONNECTION_TABLE_NAME, conn.public_id),
                format!("delete {}", conn.public_id),
                format!("lookup {}", conn.public_id),
            ]
        );
    }

    #[test]
    fn test_create_in_overridden_table() {
        let storage = temp_storage();
        storage.create_connection_table("custom_connection").unwrap();
        let repo = ConnectionRepository::new(storage.clone());
        let session = test_session(&*storage);

        let mut conn = Connection::new(&session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222).unwrap();
        conn.assign_public_id(new_public_id(CONNECTION_PREFIX).unwrap()).unwrap();
        conn.set_table_name("custom_connection");
        repo.create_connection(&ctx(), &conn).unwrap();

        assert_eq!(
            repo.lookup_connection_by_id(&ctx(), &conn.public_id),
            Err(DbError::RecordNotFound)
        );
        let mut found = Connection::alloc();
        found.public_id = conn.public_id.clone();
        found.set_table_name("custom_connection");
        repo.lookup_connection(&ctx(), &mut found).unwrap();
        assert_eq!(found, conn);
    }
}
