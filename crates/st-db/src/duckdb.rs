//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Executor, Row};
use ::duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
///
/// DuckDB takes an exclusive lock on a database file for the lifetime of a
/// read-write connection, so two processes can never migrate the same file
/// concurrently: the second one fails in [`DuckDbBackend::from_path`] with
/// [`DbError::DatabaseLocked`].
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("Could not set lock") {
                DbError::DatabaseLocked {
                    path: path.display().to_string(),
                }
            } else {
                DbError::ConnectionError(format!("{msg}: {}", path.display()))
            }
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn transaction_control(&self, statement: &str) -> DbResult<()> {
        self.conn()?
            .execute_batch(statement)
            .map_err(|e| DbError::TransactionError(format!("{statement} failed: {e}")))
    }
}

/// Read a column value as text, trying the DuckDB types the ledger uses.
///
/// DuckDB integer columns return an error for `Option<String>`, so we try
/// String -> i64 -> f64 -> bool before settling on `NULL`.
fn column_as_string(row: &::duckdb::Row<'_>, idx: usize) -> Option<String> {
    if let Ok(value) = row.get::<_, Option<String>>(idx) {
        return value;
    }
    if let Ok(value) = row.get::<_, Option<i64>>(idx) {
        return value.map(|n| n.to_string());
    }
    if let Ok(value) = row.get::<_, Option<f64>>(idx) {
        return value.map(|f| f.to_string());
    }
    if let Ok(value) = row.get::<_, Option<bool>>(idx) {
        return value.map(|b| b.to_string());
    }
    None
}

impl Executor for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        Ok(self.conn()?.execute(sql, [])?)
    }

    fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        Ok(self
            .conn()?
            .execute(sql, params_from_iter(params.iter().copied()))?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        Ok(self.conn()?.execute_batch(sql)?)
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter().copied()), |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| column_as_string(row, i))
                    .collect::<Row>())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count: i64 = self.conn()?.query_row(
            &format!("SELECT COUNT(*) FROM ({sql})"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rsplit_once('.') {
            Some((schema, table)) => (schema, table),
            None => ("main", name),
        };

        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            [schema, table],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

impl Database for DuckDbBackend {
    fn begin(&self) -> DbResult<()> {
        self.transaction_control("BEGIN TRANSACTION")
    }

    fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT")
    }

    fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    fn as_executor(&self) -> &dyn Executor {
        self
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
