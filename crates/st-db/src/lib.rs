//! st-db - Database capability for Strata
//!
//! Migration bodies and the ledger only ever see an [`Executor`]; opening,
//! committing and rolling back transactions is the job of a [`Database`].
//! DuckDB is the shipped backend.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{with_transaction, Database, Executor, Row};
