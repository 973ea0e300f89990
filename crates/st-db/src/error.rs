//! Error types for st-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Another process holds the database file (D002)
    #[error("[D002] Database '{path}' is locked by another process; serialize migration runs against it")]
    DatabaseLocked { path: String },

    /// Query execution error (D003)
    #[error("[D003] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Constraint violation, e.g. duplicate primary key (D004)
    #[error("[D004] Constraint violated: {0}")]
    ConstraintViolation(String),

    /// BEGIN / COMMIT / ROLLBACK failed (D005)
    #[error("[D005] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for constraint
        // failures, so classify on the message prefix DuckDB emits.
        let msg = err.to_string();
        if msg.contains("Constraint Error") {
            DbError::ConstraintViolation(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
