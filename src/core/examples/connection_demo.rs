use connbroker::configuration::config::StorageConfig;
use connbroker::session_management::session::{Session, SESSION_PREFIX};
use connbroker::storage::database_storage::DatabaseStorage;
use connbroker::{new_public_id, ConnectionRepository, DbError, RequestContext, Writer};
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    // Initialize logger (RUST_LOG can override; default to info)
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    // --db-path / CONNBROKER_DB_PATH pick the database, defaults to the working directory
    let config = StorageConfig::from_args();
    info!("Using database at {}", config.db_path.display());
    let storage = Arc::new(DatabaseStorage::from_config(&config).expect("open database"));
    let repo = ConnectionRepository::new(storage.clone());
    let ctx = RequestContext::with_timeout(Duration::from_secs(5));

    // Parent session the connections belong to
    let mut session = Session::new("ssh").expect("build session");
    session.public_id = new_public_id(SESSION_PREFIX).expect("session id");
    storage.create(&ctx, &session).expect("save session");
    info!("Saved session {}", session.public_id);

    // Record a connection, then read it back
    let conn = repo
        .connect(&ctx, &session.public_id, "127.0.0.1", 22, "127.0.0.1", 2222)
        .expect("record connection");
    let found = repo
        .lookup_connection_by_id(&ctx, &conn.public_id)
        .expect("lookup connection");
    if found != conn {
        warn!("Stored connection differs from the one written");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&found).expect("serialize connection")
    );

    // Invalid input never reaches the database
    match repo.connect(&ctx, "", "127.0.0.1", 22, "127.0.0.1", 2222) {
        Err(DbError::InvalidParameter(field)) => info!("Rejected connection: {}", field),
        other => warn!("Unexpected result for empty session id: {:?}", other),
    }

    // Close it: the first delete removes the row, the second is a no-op
    let deleted = repo
        .delete_connection_by_id(&ctx, &conn.public_id)
        .expect("delete connection");
    let again = repo
        .delete_connection_by_id(&ctx, &conn.public_id)
        .expect("delete connection again");
    info!("Deleted {} row(s), then {} row(s)", deleted, again);

    match repo.lookup_connection_by_id(&ctx, &conn.public_id) {
        Err(DbError::RecordNotFound) => info!("Connection {} is gone", conn.public_id),
        other => warn!("Unexpected lookup result after delete: {:?}", other),
    }

    storage.delete(&ctx, &session).expect("delete session");
}
