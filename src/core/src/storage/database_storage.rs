use std::env;
use std::future::Future;
use std::path::Path;

use log::{debug, error, info};
use regex::Regex;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, SqlErr,
    Statement, Value,
};

use crate::configuration::config::{StorageConfig, DB_PATH_ENV, DEFAULT_DB_FILE};
use crate::error_handling::types::DbError;
use crate::session_management::connection::DEFAULT_CONNECTION_TABLE_NAME;
use crate::session_management::session::DEFAULT_SESSION_TABLE_NAME;
use crate::storage::context::RequestContext;
use crate::storage::resource::{Identifiable, Resource, TableNamed, PUBLIC_ID_COLUMN};
use crate::storage::storage_trait::Writer;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

fn session_table_ddl(name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{name}\" (
            public_id TEXT PRIMARY KEY CHECK (length(public_id) > 0),
            service_name TEXT NOT NULL CHECK (length(service_name) > 0),
            start_time TEXT NOT NULL
        );"
    )
}

fn connection_table_ddl(name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{name}\" (
            public_id TEXT PRIMARY KEY CHECK (length(public_id) > 0),
            session_id TEXT NOT NULL CHECK (length(session_id) > 0)
                REFERENCES \"{session}\"(public_id) ON DELETE CASCADE,
            client_address TEXT NOT NULL CHECK (length(client_address) > 0),
            client_port INTEGER NOT NULL CHECK (client_port > 0 AND client_port <= 4294967295),
            backend_address TEXT NOT NULL CHECK (length(backend_address) > 0),
            backend_port INTEGER NOT NULL CHECK (backend_port > 0 AND backend_port <= 4294967295)
        );",
        session = DEFAULT_SESSION_TABLE_NAME,
    )
}

/// Sorts a SeaORM failure into the error kinds callers match on.
fn map_db_error(err: DbErr) -> DbError {
    let msg = err.to_string();
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(m)) => return DbError::AlreadyExists(m),
        Some(SqlErr::ForeignKeyConstraintViolation(m)) => return DbError::ForeignKey(m),
        _ => {}
    }
    // SQLite reports CHECK and NOT NULL failures only through the message
    if msg.contains("UNIQUE constraint failed") {
        DbError::AlreadyExists(msg)
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKey(msg)
    } else if msg.contains("CHECK constraint failed") || msg.contains("NOT NULL constraint failed")
    {
        DbError::CheckConstraint(msg)
    } else {
        DbError::WriteFailed(msg)
    }
}

fn require_public_id(resource: &dyn Resource) -> Result<String, DbError> {
    let id = resource.public_id();
    if id.is_empty() {
        return Err(DbError::invalid("missing public id"));
    }
    Ok(id.to_string())
}

/// SQLite storage reached through SeaORM.
///
/// Calls are blocking: the storage owns a current-thread runtime and drives
/// every query to completion on it. Do not call it from inside another Tokio
/// runtime.
pub struct DatabaseStorage {
    db: DatabaseConnection,
    identifier: Regex,
    rt: tokio::runtime::Runtime,
}

impl DatabaseStorage {
    /// Open the database named by `CONNBROKER_DB_PATH`, or the default file
    /// in the current working directory.
    pub fn new() -> Result<Self, DbError> {
        if let Ok(path) = env::var(DB_PATH_ENV) {
            info!("Using database from {}: {}", DB_PATH_ENV, path);
            return Self::new_file(path);
        }
        let cwd = env::current_dir().map_err(|e| {
            error!("Failed to get current dir: {}", e);
            DbError::ConnectionFailed
        })?;
        Self::new_file(cwd.join(DEFAULT_DB_FILE))
    }

    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let config = StorageConfig {
            db_path: path.as_ref().to_path_buf(),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, DbError> {
        config
            .validate()
            .map_err(|e| DbError::invalid(e.to_string()))?;
        let identifier = Regex::new(IDENTIFIER_PATTERN)
            .map_err(|e| DbError::invalid(format!("identifier pattern: {}", e)))?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                error!("Failed to build storage runtime: {}", e);
                DbError::ConnectionFailed
            })?;

        let path = config.db_path.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create database dir {}: {}", parent.display(), e);
                DbError::WriteFailed(e.to_string())
            })?;
        }

        let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opts.max_connections(config.max_connections)
            .sqlx_logging(config.sqlx_logging);

        let db = rt.block_on(async {
            // sqlx turns foreign keys on for every pooled SQLite connection
            let db = Database::connect(opts).await.map_err(|e| {
                error!("Failed to open database {}: {}", path.display(), e);
                DbError::ConnectionFailed
            })?;
            db.execute_unprepared(&session_table_ddl(DEFAULT_SESSION_TABLE_NAME))
                .await
                .map_err(map_db_error)?;
            db.execute_unprepared(&connection_table_ddl(DEFAULT_CONNECTION_TABLE_NAME))
                .await
                .map_err(map_db_error)?;
            Ok::<_, DbError>(db)
        })?;
        info!("DatabaseStorage initialized at {}", path.display());

        Ok(Self { db, identifier, rt })
    }

    /// Create `name` with the connection layout so that connections whose
    /// table name is overridden to `name` can be stored.
    pub fn create_connection_table(&self, name: &str) -> Result<(), DbError> {
        let table = self.checked_identifier(name)?;
        let ddl = connection_table_ddl(table);
        self.run(&RequestContext::background(), async {
            self.db
                .execute_unprepared(&ddl)
                .await
                .map_err(map_db_error)
        })?;
        info!("Created connection table {}", table);
        Ok(())
    }

    fn checked_identifier<'a>(&self, name: &'a str) -> Result<&'a str, DbError> {
        if self.identifier.is_match(name) {
            Ok(name)
        } else {
            error!("Rejected table name {:?}", name);
            Err(DbError::invalid(format!("table name {:?}", name)))
        }
    }

    /// Drive `fut` to completion, bounded by the context deadline if any.
    fn run<T, F>(&self, ctx: &RequestContext, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        self.rt.block_on(async {
            match ctx.timeout() {
                Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                    error!("Storage call exceeded {:?}", limit);
                    DbError::Timeout
                })?,
                None => fut.await,
            }
        })
    }

    fn statement(sql: String, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(DbBackend::Sqlite, sql, values)
    }
}

impl Writer for DatabaseStorage {
    fn create(&self, ctx: &RequestContext, resource: &dyn Resource) -> Result<(), DbError> {
        let table = self.checked_identifier(resource.table_name())?;
        let public_id = require_public_id(resource)?;

        let mut columns = vec![PUBLIC_ID_COLUMN];
        columns.extend_from_slice(resource.columns());
        let mut values = vec![Value::from(public_id.clone())];
        values.extend(resource.values());
        if columns.len() != values.len() {
            return Err(DbError::WriteFailed(format!(
                "{} columns but {} values for {}",
                columns.len(),
                values.len(),
                table
            )));
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        self.run(ctx, async {
            self.db
                .execute(Self::statement(sql, values))
                .await
                .map_err(|e| {
                    error!("Failed to insert {} into {}: {}", public_id, table, e);
                    map_db_error(e)
                })
        })?;
        debug!("Created {} in {}", public_id, table);
        Ok(())
    }

    fn delete(&self, ctx: &RequestContext, resource: &dyn Resource) -> Result<usize, DbError> {
        let table = self.checked_identifier(resource.table_name())?;
        let public_id = require_public_id(resource)?;

        let sql = format!("DELETE FROM \"{}\" WHERE {} = ?", table, PUBLIC_ID_COLUMN);
        let result = self.run(ctx, async {
            self.db
                .execute(Self::statement(sql, vec![Value::from(public_id.clone())]))
                .await
                .map_err(|e| {
                    error!("Failed to delete {} from {}: {}", public_id, table, e);
                    map_db_error(e)
                })
        })?;
        let deleted = result.rows_affected() as usize;
        debug!("Deleted {} row(s) for {} from {}", deleted, public_id, table);
        Ok(deleted)
    }

    fn lookup_by_id(
        &self,
        ctx: &RequestContext,
        resource: &mut dyn Resource,
    ) -> Result<(), DbError> {
        let table = self.checked_identifier(resource.table_name())?.to_string();
        let public_id = require_public_id(resource)?;

        let mut columns = vec![PUBLIC_ID_COLUMN];
        columns.extend_from_slice(resource.columns());
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} = ?",
            columns.join(", "),
            table,
            PUBLIC_ID_COLUMN
        );
        let row = self.run(ctx, async {
            self.db
                .query_one(Self::statement(sql, vec![Value::from(public_id.clone())]))
                .await
                .map_err(|e| {
                    error!("Failed to read {} from {}: {}", public_id, table, e);
                    DbError::ReadFailed(e.to_string())
                })
        })?;

        match row {
            Some(row) => resource.load(&row),
            None => {
                debug!("No row for {} in {}", public_id, table);
                Err(DbError::RecordNotFound)
            }
        }
    }
}
