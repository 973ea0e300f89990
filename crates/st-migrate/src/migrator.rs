//! The engine facade tying a database, a source, and a ledger together.
//!
//! The operations themselves live next to their helpers:
//! [`run_pending`](Migrator::run_pending) in `runner`,
//! [`rollback`](Migrator::rollback) in `rollback`, and
//! [`status`](Migrator::status) in `status`.

use crate::descriptor::Direction;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{AppliedMigrations, Ledger};
use crate::source::{Catalogue, MigrationSource};
use st_core::MigrationId;
use st_db::{with_transaction, Database};

/// Applies, reverts, and reports on migrations for one database.
///
/// Operations run to completion on the calling thread and execute migration
/// bodies strictly one after another.
pub struct Migrator<'a> {
    pub(crate) db: &'a dyn Database,
    pub(crate) source: &'a dyn MigrationSource,
    pub(crate) ledger: Ledger,
    pub(crate) verify_checksums: bool,
}

impl<'a> Migrator<'a> {
    /// A migrator using the default ledger table and checksum verification.
    pub fn new(db: &'a dyn Database, source: &'a dyn MigrationSource) -> Self {
        Self {
            db,
            source,
            ledger: Ledger::default(),
            verify_checksums: true,
        }
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Whether [`run_pending`](Self::run_pending) refuses to run when an
    /// applied migration's body no longer matches its recorded checksum.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Load the catalogue, make sure the ledger exists, and read it.
    ///
    /// The catalogue is loaded first so a discovery failure aborts before
    /// the database is touched.
    pub(crate) fn prepare(&self) -> MigrateResult<(Catalogue, AppliedMigrations)> {
        let catalogue = self.source.list()?;
        with_transaction(self.db, |tx| self.ledger.ensure_initialized(tx))?;
        let applied = self.ledger.list_applied(self.db.as_executor())?;
        log::debug!(
            "{} migration(s) available, {} applied ({} ledger: {})",
            catalogue.len(),
            applied.len(),
            self.db.db_type(),
            self.ledger.table_name()
        );
        Ok((catalogue, applied))
    }
}

/// Attach a bare database failure (BEGIN/COMMIT, ledger write) raised inside
/// a migration's transaction to that migration.
pub(crate) fn attribute(err: MigrateError, id: &MigrationId, direction: Direction) -> MigrateError {
    match err {
        MigrateError::Ledger(source) => MigrateError::Execution {
            id: id.clone(),
            direction,
            source,
        },
        other => other,
    }
}
