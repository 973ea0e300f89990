//! Shared helpers for engine unit tests.

use crate::descriptor::{Migration, SqlProcedure};
use crate::ledger::Ledger;
use st_core::MigrationId;
use st_db::{Database, DuckDbBackend};

/// Table created by [`sql_migration`] for `id`.
pub(crate) fn table_for(id: &str) -> String {
    format!("t_{}", id.replace(['-', '.'], "_"))
}

/// A reversible migration that creates (and drops) one table named after it.
pub(crate) fn sql_migration(id: &str) -> Migration {
    let table = table_for(id);
    Migration::sql(
        MigrationId::new(id),
        format!("CREATE TABLE {table} (id INTEGER)"),
        format!("DROP TABLE {table}"),
    )
}

/// A migration whose `up` creates its table and then fails.
pub(crate) fn failing_migration(id: &str) -> Migration {
    let table = table_for(id);
    Migration::sql(
        MigrationId::new(id),
        format!("CREATE TABLE {table} (id INTEGER); SELECT * FROM no_such_table"),
        format!("DROP TABLE {table}"),
    )
}

/// A migration whose `down` fails.
pub(crate) fn failing_down_migration(id: &str) -> Migration {
    let table = table_for(id);
    Migration::sql(
        MigrationId::new(id),
        format!("CREATE TABLE {table} (id INTEGER)"),
        format!("DROP TABLE {table}; DROP TABLE no_such_table"),
    )
}

/// A migration with no way back.
pub(crate) fn irreversible_migration(id: &str) -> Migration {
    Migration::irreversible(
        MigrationId::new(id),
        SqlProcedure::new(format!("CREATE TABLE {} (id INTEGER)", table_for(id))),
    )
}

pub(crate) fn memory_db() -> DuckDbBackend {
    DuckDbBackend::in_memory().unwrap()
}

pub(crate) fn table_exists(db: &dyn Database, id: &str) -> bool {
    db.relation_exists(&table_for(id)).unwrap()
}

/// Applied identifiers in application order.
pub(crate) fn applied_ids(db: &dyn Database, ledger: &Ledger) -> Vec<String> {
    ledger
        .list_applied(db.as_executor())
        .unwrap()
        .oldest_first()
        .map(|e| e.id.to_string())
        .collect()
}

/// Identifiers as plain strings, for terse assertions.
pub(crate) fn ids(list: &[MigrationId]) -> Vec<&str> {
    list.iter().map(|id| id.as_str()).collect()
}
