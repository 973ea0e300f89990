//! Applied-state ledger.
//!
//! One row per applied migration in a table inside the migrated database.
//! Mutations take the caller's transaction handle so the ledger write commits
//! or rolls back together with the migration body.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use st_core::config::{split_table_name, DEFAULT_LEDGER_TABLE};
use st_core::MigrationId;
use st_db::{DbError, Executor};
use std::collections::HashSet;

/// `applied_at` as written: DuckDB timestamps carry microseconds.
const WRITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// `applied_at` as read back; DuckDB drops a zero fraction when casting.
const READ_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One applied migration as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: MigrationId,
    pub applied_at: DateTime<Utc>,
    /// Checksum of the migration body when it was applied
    pub checksum: Option<String>,
}

/// All ledger entries, oldest first, with constant-time membership tests.
#[derive(Debug, Clone, Default)]
pub struct AppliedMigrations {
    entries: Vec<LedgerEntry>,
    ids: HashSet<MigrationId>,
}

impl AppliedMigrations {
    /// Build from entries in any order; sorts by `applied_at`, then identifier.
    pub fn new(mut entries: Vec<LedgerEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.applied_at
                .cmp(&b.applied_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        let ids = entries.iter().map(|e| e.id.clone()).collect();
        Self { entries, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in application order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// Entries in reverse application order; the rollback order.
    pub fn newest_first(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().rev()
    }

    /// Highest identifier applied so far.
    pub fn max_id(&self) -> Option<&MigrationId> {
        self.ids.iter().max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }
}

/// Handle on the ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    schema: Option<String>,
    table: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            schema: None,
            table: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl Ledger {
    /// Ledger stored in `name`, optionally schema-qualified.
    pub fn new(name: &str) -> MigrateResult<Self> {
        let (schema, table) =
            split_table_name(name).ok_or_else(|| MigrateError::InvalidLedgerTable {
                name: name.to_string(),
            })?;
        Ok(Self {
            schema: schema.map(String::from),
            table: table.to_string(),
        })
    }

    /// Fully qualified table name as used in SQL.
    pub fn table_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }

    /// Whether the ledger table has been created yet.
    pub fn exists(&self, db: &dyn Executor) -> MigrateResult<bool> {
        Ok(db.relation_exists(&self.table_name())?)
    }

    /// Create the ledger table (and schema) if absent. Safe to call every run.
    pub fn ensure_initialized(&self, tx: &dyn Executor) -> MigrateResult<()> {
        if let Some(schema) = &self.schema {
            tx.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))?;
        }
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 identifier VARCHAR PRIMARY KEY,
                 applied_at TIMESTAMP NOT NULL,
                 checksum   VARCHAR
             )",
            self.table_name()
        ))?;
        Ok(())
    }

    /// Every applied migration, oldest first.
    pub fn list_applied(&self, db: &dyn Executor) -> MigrateResult<AppliedMigrations> {
        let rows = db.query_rows(
            &format!(
                "SELECT identifier, CAST(applied_at AS VARCHAR), checksum FROM {} \
                 ORDER BY applied_at, identifier",
                self.table_name()
            ),
            &[],
        )?;

        let entries = rows
            .into_iter()
            .map(|row| self.parse_entry(row))
            .collect::<MigrateResult<Vec<_>>>()?;
        Ok(AppliedMigrations::new(entries))
    }

    fn parse_entry(&self, row: Vec<Option<String>>) -> MigrateResult<LedgerEntry> {
        let mut cols = row.into_iter();
        let (Some(Some(id)), Some(Some(applied_at)), Some(checksum)) =
            (cols.next(), cols.next(), cols.next())
        else {
            return Err(MigrateError::LedgerIntegrity {
                message: format!("malformed row in {}", self.table_name()),
            });
        };

        let id = MigrationId::parse(id).map_err(|e| MigrateError::LedgerIntegrity {
            message: format!("{} holds an invalid identifier: {e}", self.table_name()),
        })?;
        let applied_at = NaiveDateTime::parse_from_str(&applied_at, READ_TIMESTAMP_FORMAT)
            .map_err(|e| MigrateError::LedgerIntegrity {
                message: format!("unreadable applied_at '{applied_at}' for '{id}': {e}"),
            })?
            .and_utc();

        Ok(LedgerEntry {
            id,
            applied_at,
            checksum,
        })
    }

    /// Record `id` as applied now.
    ///
    /// Fails with [`MigrateError::DuplicateEntry`] if it is already recorded.
    pub fn record_applied(
        &self,
        tx: &dyn Executor,
        id: &MigrationId,
        checksum: Option<&str>,
    ) -> MigrateResult<()> {
        let table = self.table_name();
        let existing = tx.query_rows(
            &format!("SELECT identifier FROM {table} WHERE identifier = ?"),
            &[id.as_str()],
        )?;
        if !existing.is_empty() {
            return Err(MigrateError::DuplicateEntry { id: id.clone() });
        }

        let applied_at = Utc::now()
            .naive_utc()
            .format(WRITE_TIMESTAMP_FORMAT)
            .to_string();
        let result = match checksum {
            Some(checksum) => tx.execute_with_params(
                &format!(
                    "INSERT INTO {table} (identifier, applied_at, checksum) \
                     VALUES (?, CAST(? AS TIMESTAMP), ?)"
                ),
                &[id.as_str(), applied_at.as_str(), checksum],
            ),
            None => tx.execute_with_params(
                &format!(
                    "INSERT INTO {table} (identifier, applied_at, checksum) \
                     VALUES (?, CAST(? AS TIMESTAMP), NULL)"
                ),
                &[id.as_str(), applied_at.as_str()],
            ),
        };

        match result {
            Ok(_) => Ok(()),
            Err(DbError::ConstraintViolation(_)) => {
                Err(MigrateError::DuplicateEntry { id: id.clone() })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the entry for `id`.
    ///
    /// Fails with [`MigrateError::NotFound`] if there is none.
    pub fn remove_applied(&self, tx: &dyn Executor, id: &MigrationId) -> MigrateResult<()> {
        let deleted = tx.execute_with_params(
            &format!("DELETE FROM {} WHERE identifier = ?", self.table_name()),
            &[id.as_str()],
        )?;
        if deleted == 0 {
            return Err(MigrateError::NotFound { id: id.clone() });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
