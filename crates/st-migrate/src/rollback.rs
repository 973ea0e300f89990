//! Revert path: undo the most recently applied migrations, newest first.

use crate::descriptor::{Direction, Down};
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::LedgerEntry;
use crate::migrator::{attribute, Migrator};
use crate::report::BatchReport;
use st_core::MigrationId;
use st_db::with_transaction;

impl Migrator<'_> {
    /// Revert the `steps` most recently applied migrations.
    ///
    /// Asking for more steps than there are applied migrations reverts all of
    /// them. `steps == 0` does nothing. The batch stops at the first
    /// irreversible migration or failing `down`; reversions committed before
    /// that point stay committed.
    pub fn rollback(&self, steps: usize) -> BatchReport {
        let mut report = BatchReport::new(Direction::Down);
        if steps > 0 {
            if let Err(e) = self.revert_latest(steps, &mut report.completed) {
                report.error = Some(e);
            }
        }
        report.log_summary();
        report
    }

    fn revert_latest(&self, steps: usize, completed: &mut Vec<MigrationId>) -> MigrateResult<()> {
        let (catalogue, applied) = self.prepare()?;
        if steps > applied.len() {
            log::info!(
                "Requested {steps} step(s) but only {} migration(s) are applied; reverting all of them",
                applied.len()
            );
        }

        let targets: Vec<&LedgerEntry> = applied.newest_first().take(steps).collect();
        for entry in targets {
            let id = &entry.id;
            let migration = catalogue
                .get(id)
                .ok_or_else(|| MigrateError::LedgerIntegrity {
                    message: format!(
                        "applied migration '{id}' has no descriptor in the source; restore it or repair the ledger by hand"
                    ),
                })?;
            let Down::Reversible(down) = migration.down() else {
                return Err(MigrateError::MissingDown { id: id.clone() });
            };

            log::debug!("Reverting migration {id}");
            with_transaction(self.db, |tx| {
                down.run(tx).map_err(|source| MigrateError::Execution {
                    id: id.clone(),
                    direction: Direction::Down,
                    source,
                })?;
                self.ledger.remove_applied(tx, id)
            })
            .map_err(|e| attribute(e, id, Direction::Down))?;
            completed.push(id.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "rollback_test.rs"]
mod tests;
