//! Error taxonomy shared by repositories, usecases and the HTTP layer.

use thiserror::Error;

/// Top-level application error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Domain rule violations keep their literal message
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the underlying storage reported a missing record
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::NotFound(_)))
    }

    /// Shorthand for a `NotFound` database error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Database(DatabaseError::NotFound(what.into()))
    }
}

/// Storage failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => Self::Duplicate(db_err.message().to_string()),
                Some("23503") => Self::ForeignKey(db_err.message().to_string()),
                _ => Self::Query(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Connection(err.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

/// Business-rule and input validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("secret id not valid")]
    SecretIdNotValid,

    // Trailing space is part of the message callers match on.
    #[error("position id not valid ")]
    PositionIdNotValid,

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{0}")]
    Multiple(String),
}
