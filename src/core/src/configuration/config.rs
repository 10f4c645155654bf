use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default database filename, relative to the working directory
pub const DEFAULT_DB_FILE: &str = "connbroker.sqlite3";

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "CONNBROKER_DB_PATH";

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_max_connections() -> u32 {
    5
}

/// Storage configuration used to open the connection database.
///
/// It can be built from the command line (`clap`), from a TOML file (`toml`) or
/// left to its defaults. The database path also honours `CONNBROKER_DB_PATH`.
///
/// # Examples
///
/// ```no_run
/// use connbroker::configuration::config::StorageConfig;
/// use std::path::Path;
///
/// let config = StorageConfig::from_file(Path::new("connbroker.toml")).unwrap();
/// println!("Database at: {}", config.db_path.display());
/// ```
#[derive(Parser, Deserialize, Debug, Clone, PartialEq)]
#[command(name = "connbroker")]
pub struct StorageConfig {
    /// Path of the SQLite database file
    ///
    /// # Command Line
    /// Use `--db-path <PATH>` or the `CONNBROKER_DB_PATH` environment variable
    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_FILE)]
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Size of the SQLite connection pool
    ///
    /// # Command Line
    /// Use `--max-connections <COUNT>` to set this value from the CLI
    #[arg(long, default_value_t = 5)]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Forward every SQL statement to the `log` facade
    #[arg(long, action = clap::ArgAction::SetTrue)]
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_connections: default_max_connections(),
            sqlx_logging: false,
        }
    }
}

impl StorageConfig {
    /// Parses the configuration from the process arguments.
    ///
    /// # Panics
    /// Panics (through clap) when the arguments cannot be parsed.
    pub fn from_args() -> Self {
        StorageConfig::parse()
    }

    /// Reads a TOML file. Missing keys fall back to their defaults, then the
    /// `CONNBROKER_DB_PATH` override is applied.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: StorageConfig =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        debug!("Parsed storage configuration from {}", path.display());

        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            info!("Using database path from {}: {}", DB_PATH_ENV, db_path);
            config.db_path = PathBuf::from(db_path);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue("db_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::NotInRange(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
