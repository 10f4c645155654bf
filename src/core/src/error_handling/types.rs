use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingValue(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingValue(e) => write!(f, "Missing configuration value: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Errors surfaced by the persistence layer and the entities it stores.
///
/// Callers are expected to `match` on the variant; the message payloads are
/// only there for humans reading logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// A required input was empty, zero or malformed. The payload names it.
    InvalidParameter(String),
    /// No row matched the public id.
    RecordNotFound,
    /// A row with the same public id already exists.
    AlreadyExists(String),
    /// The backend rejected the row through a CHECK or NOT NULL constraint.
    CheckConstraint(String),
    /// A referenced parent row does not exist.
    ForeignKey(String),
    /// The request context deadline elapsed before the backend answered.
    Timeout,
    ConnectionFailed,
    WriteFailed(String),
    ReadFailed(String),
}

impl DbError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        DbError::InvalidParameter(what.into())
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            DbError::RecordNotFound => write!(f, "record not found"),
            DbError::AlreadyExists(e) => write!(f, "record already exists: {}", e),
            DbError::CheckConstraint(e) => write!(f, "constraint check failed: {}", e),
            DbError::ForeignKey(e) => write!(f, "foreign key violation: {}", e),
            DbError::Timeout => write!(f, "request timed out"),
            DbError::ConnectionFailed => write!(f, "Storage connection failed"),
            DbError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
            DbError::ReadFailed(e) => write!(f, "Storage read failed: {}", e),
        }
    }
}

impl std::error::Error for DbError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_field() {
        let err = DbError::invalid("missing session id");
        assert_eq!(err.to_string(), "invalid parameter: missing session id");
        assert!(matches!(err, DbError::InvalidParameter(_)));
    }

    #[test]
    fn test_config_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
