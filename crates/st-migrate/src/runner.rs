//! Apply path: run every pending migration in identifier order.

use crate::descriptor::{Direction, Migration};
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::AppliedMigrations;
use crate::migrator::{attribute, Migrator};
use crate::report::BatchReport;
use crate::source::Catalogue;
use crate::status::Drift;
use st_core::MigrationId;
use st_db::with_transaction;
use std::sync::Arc;

impl Migrator<'_> {
    /// Apply all pending migrations, oldest identifier first.
    ///
    /// Each migration runs in its own transaction together with its ledger
    /// entry. The first failure rolls back that migration and stops the
    /// batch; nothing after it runs. Calling this again when nothing is
    /// pending is a no-op.
    pub fn run_pending(&self) -> BatchReport {
        let mut report = BatchReport::new(Direction::Up);
        if let Err(e) = self.apply_pending(&mut report.completed) {
            report.error = Some(e);
        }
        report.log_summary();
        report
    }

    fn apply_pending(&self, completed: &mut Vec<MigrationId>) -> MigrateResult<()> {
        let (catalogue, applied) = self.prepare()?;
        self.verify_history(&catalogue, &applied)?;

        let pending: Vec<&Arc<Migration>> = catalogue
            .iter()
            .filter(|m| !applied.contains(m.id()))
            .collect();
        if pending.is_empty() {
            log::info!("Database is up to date ({} applied)", applied.len());
            return Ok(());
        }

        if !self.db.supports_transactional_ddl() {
            log::warn!(
                "{} cannot roll back DDL; a failing migration may leave partial schema changes",
                self.db.db_type()
            );
        }
        if let Some(latest) = applied.max_id() {
            for migration in pending.iter().filter(|m| m.id() < latest) {
                log::warn!(
                    "Migration '{}' sorts before already-applied '{latest}'; applying it out of order",
                    migration.id()
                );
            }
        }

        for migration in pending {
            let id = migration.id();
            log::debug!("Applying migration {id}");
            with_transaction(self.db, |tx| {
                migration
                    .apply(tx)
                    .map_err(|source| MigrateError::Execution {
                        id: id.clone(),
                        direction: Direction::Up,
                        source,
                    })?;
                self.ledger.record_applied(tx, id, migration.checksum())
            })
            .map_err(|e| attribute(e, id, Direction::Up))?;
            completed.push(id.clone());
        }
        Ok(())
    }

    /// Refuse to build on a ledger that no longer matches the catalogue.
    fn verify_history(&self, catalogue: &Catalogue, applied: &AppliedMigrations) -> MigrateResult<()> {
        let drift = Drift::between(catalogue, applied);
        if !drift.orphaned.is_empty() {
            return Err(MigrateError::LedgerIntegrity {
                message: format!(
                    "applied migration(s) missing from the source: {}",
                    join_ids(&drift.orphaned)
                ),
            });
        }
        if self.verify_checksums && !drift.modified.is_empty() {
            return Err(MigrateError::LedgerIntegrity {
                message: format!(
                    "applied migration(s) changed since they were applied: {} (add a new migration instead of editing)",
                    join_ids(&drift.modified)
                ),
            });
        }
        Ok(())
    }
}

fn join_ids(ids: &[MigrationId]) -> String {
    ids.iter()
        .map(MigrationId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
