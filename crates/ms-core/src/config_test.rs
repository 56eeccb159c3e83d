use super::*;

#[test]
fn test_parse_minimal_config() {
    let yaml = r#"
name: test_project
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.migration_paths, vec!["migrations".to_string()]);
    assert_eq!(config.ledger, LedgerConfig::default());
    assert_eq!(config.ledger.migrations_table, "_Migrations");
    assert_eq!(config.ledger.config_table, "_MigrationsConfig");
    assert_eq!(config.default_limit, 1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: billing
database:
  type: duckdb
  path: "./billing.duckdb"
migration_paths:
  - migrations
  - migrations/seed
ledger:
  migrations_table: schema_ledger
  config_table: schema_ledger_config
default_limit: 5
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.name, "billing");
    assert_eq!(config.migration_paths.len(), 2);
    assert_eq!(config.ledger.migrations_table, "schema_ledger");
    assert_eq!(config.ledger.config_table, "schema_ledger_config");
    assert_eq!(config.default_limit, 5);
    assert!(config.validate().is_ok());

    let root = PathBuf::from("/srv/billing");
    assert_eq!(
        config.migration_paths_absolute(&root),
        vec![root.join("migrations"), root.join("migrations/seed")]
    );
    assert_eq!(
        config.database_path(&root),
        root.join("./billing.duckdb").display().to_string()
    );
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: test\nmigration_dir: x");
    assert!(result.is_err());
}

#[test]
fn test_memory_path_not_resolved() {
    let config: Config = serde_yaml::from_str("name: test").unwrap();
    assert_eq!(config.database_path(Path::new("/tmp/project")), ":memory:");
}

#[test]
fn test_validate_rejects_empty_name() {
    let config: Config = serde_yaml::from_str("name: ''").unwrap();
    assert!(matches!(
        config.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_limit() {
    let config: Config = serde_yaml::from_str("name: test\ndefault_limit: 0").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_migration_paths() {
    let config: Config = serde_yaml::from_str("name: test\nmigration_paths: []").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_quoted_table_name() {
    let yaml = r#"
name: test
ledger:
  migrations_table: 'bad"name'
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("ledger.migrations_table"));
}

#[test]
fn test_validate_rejects_same_table_names() {
    let yaml = r#"
name: test
ledger:
  migrations_table: ledger
  config_table: LEDGER
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_dir_yml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("migrasync.yml"), "name: from_yml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yml");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("migrasync.yaml"), "name: from_yaml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_validates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("migrasync.yml"), "name: x\ndefault_limit: 0\n").unwrap();
    assert!(matches!(
        Config::load_from_dir(dir.path()),
        Err(CoreError::ConfigInvalid { .. })
    ));
}
