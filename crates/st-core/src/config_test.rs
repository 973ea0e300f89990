use super::*;
use serial_test::serial;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: courtside").unwrap();
    assert_eq!(config.name, "courtside");
    assert_eq!(config.migrations_path, "migrations");
    assert_eq!(config.database, DatabaseConfig::default());
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.ledger.table, DEFAULT_LEDGER_TABLE);
    assert!(config.verify_checksums);
    assert!(config.targets.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: courtside
migrations_path: db/migrations
database:
  type: duckdb
  path: ./courtside.duckdb
ledger:
  table: ops.schema_migrations
verify_checksums: false
targets:
  prod:
    database:
      path: /srv/courtside.duckdb
  ci: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.migrations_path, "db/migrations");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, "./courtside.duckdb");
    assert_eq!(config.ledger.table, "ops.schema_migrations");
    assert!(!config.verify_checksums);
    assert_eq!(config.available_targets(), vec!["ci", "prod"]);
}

#[test]
fn test_unknown_fields_rejected() {
    assert!(serde_yaml::from_str::<Config>("name: x\nmigration_path: typo").is_err());
}

#[test]
fn test_get_database_config_target_override() {
    let yaml = r#"
name: courtside
database:
  path: dev.duckdb
targets:
  prod:
    database:
      path: prod.duckdb
  ci: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.get_database_config(None).unwrap().path, "dev.duckdb");
    assert_eq!(
        config.get_database_config(Some("prod")).unwrap().path,
        "prod.duckdb"
    );
    // Target without a database section falls back to the base config
    assert_eq!(
        config.get_database_config(Some("ci")).unwrap().path,
        "dev.duckdb"
    );
}

#[test]
fn test_get_database_config_unknown_target() {
    let config: Config =
        serde_yaml::from_str("name: courtside\ntargets:\n  prod: {}\n  dev: {}").unwrap();
    let err = config.get_database_config(Some("staging")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Target 'staging' not found"));
    assert!(msg.contains("dev, prod"));
}

#[test]
fn test_split_table_name() {
    assert_eq!(
        split_table_name("schema_migrations"),
        Some((None, "schema_migrations"))
    );
    assert_eq!(
        split_table_name("ops.schema_migrations"),
        Some((Some("ops"), "schema_migrations"))
    );
    assert_eq!(split_table_name(""), None);
    assert_eq!(split_table_name("a.b.c"), None);
    assert_eq!(split_table_name(".table"), None);
    assert_eq!(split_table_name("bad-name"), None);
    assert_eq!(split_table_name("t; DROP TABLE x"), None);
}

#[test]
fn test_load_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("strata.yml"), "name: courtside\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "courtside");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("strata.yaml"), "name: courtside\n").unwrap();
    assert!(Config::load_from_dir(dir.path()).is_ok());
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("strata.yml"), "name: \"\"\n").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_load_rejects_bad_ledger_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("strata.yml"),
        "name: courtside\nledger:\n  table: \"migrations; --\"\n",
    )
    .unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid ledger table"));
}

#[test]
fn test_load_reports_parse_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("strata.yml"), "name: [unclosed\n").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
    assert!(err.to_string().contains("strata.yml"));
}

#[test]
fn test_project_load_with_config_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ci.yml"),
        "name: courtside_ci\nmigrations_path: sql\n",
    )
    .unwrap();
    let project = Project::load(dir.path(), Some(Path::new("ci.yml"))).unwrap();
    assert_eq!(project.config.name, "courtside_ci");
    assert_eq!(project.migrations_dir(), dir.path().join("sql"));
}

#[test]
fn test_project_load_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let err = Project::load(&dir.path().join("nope"), None).unwrap_err();
    assert!(matches!(err, CoreError::ProjectNotFound { .. }));
}

#[test]
#[serial]
fn test_resolve_target_priority() {
    std::env::set_var(TARGET_ENV_VAR, "staging");
    assert_eq!(Config::resolve_target(Some("prod")), Some("prod".to_string()));
    assert_eq!(Config::resolve_target(None), Some("staging".to_string()));
    std::env::remove_var(TARGET_ENV_VAR);
    assert_eq!(Config::resolve_target(None), None);
}

#[test]
#[serial]
fn test_resolve_target_ignores_empty_env() {
    std::env::set_var(TARGET_ENV_VAR, "");
    assert_eq!(Config::resolve_target(None), None);
    std::env::remove_var(TARGET_ENV_VAR);
}
