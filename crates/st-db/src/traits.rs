//! Database capability traits

use crate::error::{DbError, DbResult};

/// One result row, every column coerced to text. `None` is SQL `NULL`.
pub type Row = Vec<Option<String>>;

/// Statement execution against whatever transaction is currently open.
///
/// This is the handle migration bodies receive. It has no way to
/// begin, commit or roll back: transaction boundaries belong to the caller.
pub trait Executor {
    /// Execute one statement, returning the number of affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute one statement with positional `?` parameters bound as text
    fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Execute a `;`-separated script
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query with positional `?` parameters and collect every row
    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>>;

    /// Count the rows a query returns
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists (`name` may be `schema.table`)
    fn relation_exists(&self, name: &str) -> DbResult<bool>;
}

/// A connection that can scope work in transactions.
pub trait Database: Executor {
    /// Open a transaction
    fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Whether DDL inside a transaction is undone by `rollback`.
    ///
    /// When `false`, a failed migration may leave partial schema changes
    /// behind even though its ledger entry is rolled back.
    fn supports_transactional_ddl(&self) -> bool;

    /// View this connection as a plain [`Executor`]
    fn as_executor(&self) -> &dyn Executor;
}

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
///
/// A failed `COMMIT` is rolled back and reported as
/// [`DbError::TransactionError`]; the body's own error wins over a failed
/// `ROLLBACK`, which is only logged.
pub fn with_transaction<T, E, F>(db: &dyn Database, body: F) -> Result<T, E>
where
    F: FnOnce(&dyn Executor) -> Result<T, E>,
    E: From<DbError>,
{
    db.begin()?;

    match body(db.as_executor()) {
        Ok(value) => {
            if let Err(commit_err) = db.commit() {
                if let Err(rollback_err) = db.rollback() {
                    log::error!("ROLLBACK after failed COMMIT also failed: {rollback_err}");
                }
                return Err(DbError::TransactionError(format!("COMMIT failed: {commit_err}")).into());
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = db.rollback() {
                log::error!("ROLLBACK failed: {rollback_err}");
            }
            Err(err)
        }
    }
}
