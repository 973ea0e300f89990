use super::*;
use crate::descriptor::Migration;
use crate::ledger::Ledger;
use crate::source::RegistrySource;
use crate::test_utils::{
    applied_ids, failing_down_migration, ids, irreversible_migration, memory_db, sql_migration,
    table_exists,
};
use st_db::DuckDbBackend;

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

fn courtside() -> RegistrySource {
    registry(vec![
        sql_migration("001_create_locations"),
        sql_migration("002_create_matches"),
        sql_migration("003_add_courts"),
    ])
}

fn migrated(source: &RegistrySource) -> DuckDbBackend {
    let db = memory_db();
    let report = Migrator::new(&db, source).run_pending();
    assert!(report.is_success(), "{:?}", report.error);
    db
}

#[test]
fn reverts_the_newest_migration() {
    let source = three();
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(1);

    assert!(report.is_success());
    assert_eq!(ids(&report.completed), ["003"]);
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "002"]);
    assert!(!table_exists(&db, "003"));
    assert!(table_exists(&db, "002"));
}

#[test]
fn full_rollback_restores_the_initial_schema() {
    let source = three();
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(3);

    assert_eq!(ids(&report.completed), ["003", "002", "001"]);
    assert!(applied_ids(&db, &Ledger::default()).is_empty());
    for id in ["001", "002", "003"] {
        assert!(!table_exists(&db, id));
    }

    let reapplied = Migrator::new(&db, &source).run_pending();
    assert_eq!(ids(&reapplied.completed), ["001", "002", "003"]);
}

#[test]
fn clamps_to_what_is_applied() {
    let source = registry(vec![sql_migration("001"), sql_migration("002")]);
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(10);

    assert!(report.is_success());
    assert_eq!(ids(&report.completed), ["002", "001"]);
    assert!(applied_ids(&db, &Ledger::default()).is_empty());
}

#[test]
fn zero_steps_is_a_no_op() {
    let source = three();
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(0);

    assert!(report.is_success());
    assert!(report.completed.is_empty());
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "002", "003"]);
}

#[test]
fn nothing_applied_is_not_an_error() {
    let db = memory_db();
    let report = Migrator::new(&db, &three()).rollback(1);

    assert!(report.is_success());
    assert!(report.completed.is_empty());
}

#[test]
fn irreversible_newest_leaves_everything_in_place() {
    let source = registry(vec![sql_migration("001"), irreversible_migration("002")]);
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(1);

    assert!(report.completed.is_empty());
    match report.error {
        Some(MigrateError::MissingDown { id }) => assert_eq!(id, "002"),
        other => panic!("expected MissingDown, got {other:?}"),
    }
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "002"]);
    assert!(table_exists(&db, "002"));
}

#[test]
fn stops_at_an_irreversible_migration_mid_batch() {
    let source = registry(vec![irreversible_migration("001"), sql_migration("002")]);
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(2);

    assert_eq!(ids(&report.completed), ["002"]);
    assert!(matches!(report.error, Some(MigrateError::MissingDown { .. })));
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001"]);
}

#[test]
fn failing_down_keeps_the_migration_applied() {
    let source = registry(vec![sql_migration("001"), failing_down_migration("002")]);
    let db = migrated(&source);

    let report = Migrator::new(&db, &source).rollback(2);

    assert!(report.completed.is_empty());
    assert!(matches!(
        report.error,
        Some(MigrateError::Execution {
            direction: Direction::Down,
            ..
        })
    ));
    assert_eq!(report.failed_id().map(|id| id.as_str()), Some("002"));
    assert!(table_exists(&db, "002"), "partial down of 002 survived");
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "002"]);
}

#[test]
fn orphaned_entry_is_a_ledger_integrity_error() {
    let db = migrated(&three());
    let missing_newest = registry(vec![sql_migration("001"), sql_migration("002")]);

    let report = Migrator::new(&db, &missing_newest).rollback(1);

    match report.error {
        Some(MigrateError::LedgerIntegrity { message }) => assert!(message.contains("003")),
        other => panic!("expected LedgerIntegrity, got {other:?}"),
    }
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "002", "003"]);
}

#[test]
fn follows_application_order_not_identifier_order() {
    let db = migrated(&registry(vec![sql_migration("001"), sql_migration("003")]));
    let all = three();
    assert!(Migrator::new(&db, &all).run_pending().is_success());

    let report = Migrator::new(&db, &all).rollback(1);

    assert_eq!(ids(&report.completed), ["002"]);
    assert_eq!(applied_ids(&db, &Ledger::default()), ["001", "003"]);
}

#[test]
fn courtside_rollback_two_leaves_only_locations() {
    let source = courtside();
    let db = migrated(&source);
    let migrator = Migrator::new(&db, &source);

    let report = migrator.rollback(2);

    assert!(report.is_success(), "{:?}", report.error);
    assert_eq!(
        ids(&report.completed),
        ["003_add_courts", "002_create_matches"]
    );
    let status = migrator.status().unwrap();
    let applied: Vec<&str> = status.applied_ids().into_iter().map(|id| id.as_str()).collect();
    assert_eq!(applied, ["001_create_locations"]);
    assert_eq!(
        ids(&status.pending),
        ["002_create_matches", "003_add_courts"]
    );
    assert!(status.orphaned.is_empty());
}

#[test]
fn apply_then_rollback_one_restores_status() {
    let db = migrated(&registry(vec![sql_migration("001"), sql_migration("002")]));
    let source = three();
    let migrator = Migrator::new(&db, &source);
    let before = migrator.status().unwrap();
    assert_eq!(ids(&before.pending), ["003"]);

    assert_eq!(ids(&migrator.run_pending().completed), ["003"]);
    assert_ne!(migrator.status().unwrap(), before);
    assert_eq!(ids(&migrator.rollback(1).completed), ["003"]);

    assert_eq!(migrator.status().unwrap(), before);
}

#[test]
fn full_round_trip_restores_fresh_status() {
    let db = memory_db();
    let source = three();
    let migrator = Migrator::new(&db, &source);
    let fresh = migrator.status().unwrap();

    assert!(migrator.run_pending().is_success());
    assert!(migrator.rollback(3).is_success());

    assert_eq!(migrator.status().unwrap(), fresh);
}
