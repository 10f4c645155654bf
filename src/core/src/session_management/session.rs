use crate::error_handling::types::DbError;
use crate::storage::db_entities::SessionRow;
use crate::storage::resource::{Identifiable, Resource, TableNamed};
use chrono::{DateTime, Utc};
use log::error;
use sea_orm::{QueryResult, Value};
use serde::{Deserialize, Serialize};

pub const SESSION_PREFIX: &str = "s";

pub const DEFAULT_SESSION_TABLE_NAME: &str = "session";

const COLUMNS: &[&str] = &["service_name", "start_time"];

/// The parent record connections point at.
///
/// Only what connections need is kept here: an id, the service the session
/// was opened for and when it started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub public_id: String,
    pub service_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip)]
    table_name: Option<String>,
}

impl Session {
    pub fn new(service_name: &str) -> Result<Self, DbError> {
        if service_name.is_empty() {
            return Err(DbError::invalid("missing service name"));
        }
        Ok(Self {
            service_name: service_name.to_string(),
            start_time: Utc::now(),
            ..Default::default()
        })
    }

    pub fn alloc() -> Self {
        Self::default()
    }
}

impl Identifiable for Session {
    fn public_id(&self) -> &str {
        &self.public_id
    }
}

impl TableNamed for Session {
    fn table_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(DEFAULT_SESSION_TABLE_NAME)
    }

    fn set_table_name(&mut self, name: &str) {
        self.table_name = (!name.is_empty()).then(|| name.to_string());
    }
}

impl Resource for Session {
    fn columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.service_name.clone()),
            Value::from(self.start_time.to_rfc3339()),
        ]
    }

    fn load(&mut self, row: &QueryResult) -> Result<(), DbError> {
        let row = SessionRow::from_row(row)?;
        let start_time = DateTime::parse_from_rfc3339(&row.start_time)
            .map_err(|e| {
                error!("Invalid start_time for session {}: {}", row.public_id, e);
                DbError::ReadFailed(e.to_string())
            })?
            .with_timezone(&Utc);

        self.public_id = row.public_id;
        self.service_name = row.service_name;
        self.start_time = start_time;
        Ok(())
    }
}
