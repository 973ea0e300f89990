//! Status reporting: what is applied, what is pending, what is inconsistent.

use crate::error::MigrateResult;
use crate::ledger::{AppliedMigrations, LedgerEntry};
use crate::migrator::Migrator;
use crate::source::Catalogue;
use serde::Serialize;
use st_core::MigrationId;

/// Difference between the catalogue and the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Applied migrations, oldest first
    pub applied: Vec<LedgerEntry>,
    /// Migrations not yet applied, in identifier order
    pub pending: Vec<MigrationId>,
    /// Ledger entries with no migration in the source
    pub orphaned: Vec<MigrationId>,
    /// Applied migrations whose body changed since they were applied
    pub modified: Vec<MigrationId>,
}

impl StatusReport {
    /// Applied identifiers, oldest first.
    pub fn applied_ids(&self) -> Vec<&MigrationId> {
        self.applied.iter().map(|e| &e.id).collect()
    }

    /// No orphaned or modified entries.
    pub fn is_consistent(&self) -> bool {
        self.orphaned.is_empty() && self.modified.is_empty()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Ledger entries that disagree with the catalogue.
#[derive(Debug, Default)]
pub(crate) struct Drift {
    pub(crate) orphaned: Vec<MigrationId>,
    pub(crate) modified: Vec<MigrationId>,
}

impl Drift {
    pub(crate) fn between(catalogue: &Catalogue, applied: &AppliedMigrations) -> Self {
        let orphaned = applied
            .oldest_first()
            .filter(|entry| !catalogue.contains(&entry.id))
            .map(|entry| entry.id.clone())
            .collect();

        // Only SQL-defined migrations carry checksums on both sides.
        let modified = catalogue
            .iter()
            .filter(|m| {
                let recorded = applied.get(m.id()).and_then(|e| e.checksum.as_deref());
                matches!((recorded, m.checksum()), (Some(r), Some(c)) if r != c)
            })
            .map(|m| m.id().clone())
            .collect();

        Drift { orphaned, modified }
    }
}

impl Migrator<'_> {
    /// Compare the catalogue with the ledger.
    ///
    /// Read-only: a database that was never migrated reports everything as
    /// pending without creating the ledger table.
    pub fn status(&self) -> MigrateResult<StatusReport> {
        let catalogue = self.source.list()?;
        let executor = self.db.as_executor();
        let applied = if self.ledger.exists(executor)? {
            self.ledger.list_applied(executor)?
        } else {
            AppliedMigrations::default()
        };

        let Drift { orphaned, modified } = Drift::between(&catalogue, &applied);
        let pending = catalogue
            .ids()
            .filter(|id| !applied.contains(id))
            .cloned()
            .collect();

        Ok(StatusReport {
            applied: applied.into_entries(),
            pending,
            orphaned,
            modified,
        })
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
