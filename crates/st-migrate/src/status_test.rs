use super::*;
use crate::descriptor::Migration;
use crate::ledger::Ledger;
use crate::source::RegistrySource;
use crate::test_utils::{applied_ids, ids, memory_db, sql_migration};

fn registry(migrations: Vec<Migration>) -> RegistrySource {
    migrations.into_iter().collect()
}

fn three() -> RegistrySource {
    registry(vec![
        sql_migration("001"),
        sql_migration("002"),
        sql_migration("003"),
    ])
}

#[test]
fn fresh_database_reports_everything_pending() {
    let db = memory_db();
    let status = Migrator::new(&db, &three()).status().unwrap();

    assert!(status.applied.is_empty());
    assert_eq!(ids(&status.pending), ["001", "002", "003"]);
    assert!(status.is_consistent());
    assert!(!status.is_up_to_date());
    assert!(
        !Ledger::default().exists(&db).unwrap(),
        "status must not create the ledger"
    );
}

#[test]
fn partially_migrated_database() {
    let db = memory_db();
    let first = registry(vec![sql_migration("001")]);
    assert!(Migrator::new(&db, &first).run_pending().is_success());

    let status = Migrator::new(&db, &three()).status().unwrap();

    let applied: Vec<&str> = status.applied_ids().into_iter().map(|id| id.as_str()).collect();
    assert_eq!(applied, ["001"]);
    assert_eq!(ids(&status.pending), ["002", "003"]);
}

#[test]
fn reports_orphaned_and_modified_entries() {
    let db = memory_db();
    assert!(Migrator::new(&db, &three()).run_pending().is_success());

    let drifted = registry(vec![
        Migration::sql(
            MigrationId::new("001"),
            "CREATE TABLE t_001 (id BIGINT)",
            "DROP TABLE t_001",
        ),
        sql_migration("003"),
        sql_migration("004"),
    ]);
    let status = Migrator::new(&db, &drifted).status().unwrap();

    assert_eq!(ids(&status.orphaned), ["002"]);
    assert_eq!(ids(&status.modified), ["001"]);
    assert_eq!(ids(&status.pending), ["004"]);
    assert_eq!(status.applied.len(), 3);
    assert!(!status.is_consistent());
}

#[test]
fn status_does_not_modify_the_ledger() {
    let db = memory_db();
    let source = three();
    let migrator = Migrator::new(&db, &source);
    assert!(migrator.run_pending().is_success());
    let before = applied_ids(&db, migrator.ledger());

    migrator.status().unwrap();
    migrator.status().unwrap();

    assert_eq!(applied_ids(&db, migrator.ledger()), before);
}

#[test]
fn discovery_errors_propagate() {
    let db = memory_db();
    let source = registry(vec![sql_migration("001"), sql_migration("001")]);

    let err = Migrator::new(&db, &source).status().unwrap_err();

    assert!(matches!(err, crate::error::MigrateError::Discovery { .. }));
}

#[test]
fn serializes_for_machine_readers() {
    let db = memory_db();
    let source = three();
    let migrator = Migrator::new(&db, &source);
    let first = registry(vec![sql_migration("001")]);
    assert!(Migrator::new(&db, &first).run_pending().is_success());

    let json = serde_json::to_value(migrator.status().unwrap()).unwrap();

    assert_eq!(json["applied"][0]["id"], "001");
    assert!(json["applied"][0]["applied_at"].is_string());
    assert_eq!(json["pending"], serde_json::json!(["002", "003"]));
    assert_eq!(json["orphaned"], serde_json::json!([]));
}
