//! Error types for nestorm

use thiserror::Error;

/// Result type alias for nestorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building, execution and result shaping
#[derive(Debug, Error)]
pub enum OrmError {
    /// A required argument (e.g. the table name) was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// The result shaper was given empty or non-object input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The table is not present in the schema registry
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Query execution error reported by the SQLite collaborator
    #[cfg(feature = "sqlite")]
    #[error("Query error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Query execution error reported by any other collaborator
    #[error("Query error: {0}")]
    Query(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error (unsafe identifier, unsupported operator, bad options)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OrmError {
    /// Create a missing argument error
    pub fn missing_argument(message: impl Into<String>) -> Self {
        Self::MissingArgument(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a missing argument error
    pub fn is_missing_argument(&self) -> bool {
        matches!(self, Self::MissingArgument(_))
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is an unknown table error
    pub fn is_unknown_table(&self) -> bool {
        matches!(self, Self::UnknownTable(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a rusqlite error into a more specific OrmError
    #[cfg(feature = "sqlite")]
    pub fn from_db_error(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        if let rusqlite::Error::SqliteFailure(code, message) = &err {
            let message = message.clone().unwrap_or_else(|| code.to_string());
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(message);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(message),
                ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(message),
                _ => {}
            }
        }
        Self::Sqlite(err)
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
