//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failed
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a write error, surfacing unique violations as [`DbError::Conflict`]
    pub fn from_write(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            other => Self::Sqlx(other),
        }
    }
}
