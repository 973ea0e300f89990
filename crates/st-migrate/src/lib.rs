//! Migration engine for Strata.
//!
//! Applies an ordered catalogue of reversible schema changes to a database and
//! records each applied change in a ledger table inside that same database.
//! Every migration runs in its own transaction together with its ledger
//! write, so a migration is either applied and recorded, or neither.
//!
//! The entry point is [`Migrator`]:
//!
//! ```no_run
//! use st_db::DuckDbBackend;
//! use st_migrate::{DirectorySource, Migrator};
//!
//! let db = DuckDbBackend::new("app.duckdb")?;
//! let source = DirectorySource::new("migrations");
//! let report = Migrator::new(&db, &source).run_pending();
//! for id in &report.completed {
//!     println!("applied {id}");
//! }
//! # Ok::<(), st_db::DbError>(())
//! ```

pub mod descriptor;
pub mod error;
pub mod ledger;
pub mod migrator;
pub mod report;
mod rollback;
mod runner;
pub mod source;
pub mod status;

#[cfg(test)]
pub(crate) mod test_utils;

pub use descriptor::{Direction, Down, Migration, Procedure, SqlProcedure};
pub use error::{MigrateError, MigrateResult};
pub use ledger::{AppliedMigrations, Ledger, LedgerEntry};
pub use migrator::Migrator;
pub use report::BatchReport;
pub use source::{Catalogue, DirectorySource, MigrationSource, RegistrySource};
pub use status::StatusReport;
