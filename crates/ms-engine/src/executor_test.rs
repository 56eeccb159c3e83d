use super::*;
use crate::reconcile;
use crate::schema::ensure_schema;
use ms_core::{Migration, SqlMigration};
use ms_db::DuckDbBackend;

fn table(id: &str, order: i64) -> Box<dyn Migration> {
    Box::new(SqlMigration::new(
        id,
        order,
        format!("CREATE TABLE {id} (id INT)"),
        format!("DROP TABLE {id}"),
    ))
}

async fn setup(migrations: Vec<Box<dyn Migration>>) -> (DuckDbBackend, LedgerSchema, MigrationRegistry) {
    let db = DuckDbBackend::in_memory().unwrap();
    let schema = LedgerSchema::default();
    let mut registry = MigrationRegistry::new();
    for m in migrations {
        registry.register(m).unwrap();
    }

    let mut tx = db.begin().await.unwrap();
    ensure_schema(tx.as_mut(), &schema).await.unwrap();
    reconcile::sync(tx.as_mut(), &schema, &mut registry, Utc::now())
        .await
        .unwrap();
    tx.commit().await.unwrap();
    drop(tx);
    (db, schema, registry)
}

async fn exists(db: &DuckDbBackend, name: &str) -> bool {
    let mut tx = db.begin().await.unwrap();
    let found = tx.table_exists(name).await.unwrap();
    tx.commit().await.unwrap();
    found
}

async fn ledger_flag(db: &DuckDbBackend, schema: &LedgerSchema, id: &str) -> bool {
    let mut tx = db.begin().await.unwrap();
    let row = ledger::find_row(tx.as_mut(), schema, id).await.unwrap().unwrap();
    tx.commit().await.unwrap();
    row.executed
}

#[test]
fn test_run_config_defaults_to_one() {
    assert_eq!(RunConfig::default().limit, Some(1));
    assert_eq!(RunConfig::unbounded().limit, None);
    assert_eq!(RunConfig::limit(3).limit, Some(3));
}

#[tokio::test]
async fn test_select_batch_respects_limit() {
    let (_db, _schema, registry) = setup(vec![table("c", 3), table("a", 1), table("b", 2)]).await;

    assert_eq!(
        select_batch(&registry, Direction::Forward, RunConfig::unbounded()),
        vec!["a", "b", "c"]
    );
    assert_eq!(
        select_batch(&registry, Direction::Forward, RunConfig::limit(2)),
        vec!["a", "b"]
    );
    assert!(select_batch(&registry, Direction::Forward, RunConfig::limit(0)).is_empty());
    assert!(select_batch(&registry, Direction::Backward, RunConfig::unbounded()).is_empty());
}

#[tokio::test]
async fn test_run_batch_forward_updates_database_ledger_and_memory() {
    let (db, schema, mut registry) = setup(vec![table("a", 1), table("b", 2)]).await;
    let batch = select_batch(&registry, Direction::Forward, RunConfig::unbounded());

    let report = run_batch(&db, &schema, &mut registry, &batch, Direction::Forward)
        .await
        .unwrap();
    assert_eq!(report.direction, Direction::Forward);
    assert_eq!(report.executed, vec!["a", "b"]);
    assert!(report.skipped.is_empty());

    assert!(exists(&db, "a").await);
    assert!(exists(&db, "b").await);
    assert!(ledger_flag(&db, &schema, "a").await);
    assert!(registry.get("b").unwrap().executed());
}

#[tokio::test]
async fn test_run_batch_backward() {
    let (db, schema, mut registry) = setup(vec![table("a", 1), table("b", 2)]).await;
    let forward = select_batch(&registry, Direction::Forward, RunConfig::unbounded());
    run_batch(&db, &schema, &mut registry, &forward, Direction::Forward)
        .await
        .unwrap();

    let backward = select_batch(&registry, Direction::Backward, RunConfig::limit(1));
    assert_eq!(backward, vec!["b"]);
    let report = run_batch(&db, &schema, &mut registry, &backward, Direction::Backward)
        .await
        .unwrap();
    assert_eq!(report.executed, vec!["b"]);

    assert!(exists(&db, "a").await);
    assert!(!exists(&db, "b").await);
    assert!(!ledger_flag(&db, &schema, "b").await);
    assert!(!registry.get("b").unwrap().executed());
}

#[tokio::test]
async fn test_run_batch_skips_migrations_in_target_state() {
    let (db, schema, mut registry) = setup(vec![table("a", 1), table("b", 2)]).await;
    run_batch(&db, &schema, &mut registry, &["a".to_string()], Direction::Forward)
        .await
        .unwrap();

    let batch = vec!["a".to_string(), "b".to_string(), "ghost".to_string()];
    let report = run_batch(&db, &schema, &mut registry, &batch, Direction::Forward)
        .await
        .unwrap();
    assert_eq!(report.executed, vec!["b"]);
    assert_eq!(report.skipped, vec!["a", "ghost"]);
}

#[tokio::test]
async fn test_run_batch_stops_at_first_failure() {
    let broken: Box<dyn Migration> = Box::new(SqlMigration::new(
        "broken",
        2,
        "CREATE TABLE broken (id INT); SELECT * FROM missing_table",
        "DROP TABLE broken",
    ));
    let (db, schema, mut registry) = setup(vec![table("a", 1), broken, table("c", 3)]).await;
    let batch = select_batch(&registry, Direction::Forward, RunConfig::unbounded());

    let err = run_batch(&db, &schema, &mut registry, &batch, Direction::Forward)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Execution { ref id, direction: Direction::Forward, .. } if id == "broken"
    ));
    assert_eq!(err.migration_id(), Some("broken"));

    // First step stays committed, the failing step rolled back, the rest never ran
    assert!(exists(&db, "a").await);
    assert!(ledger_flag(&db, &schema, "a").await);
    assert!(!exists(&db, "broken").await);
    assert!(!ledger_flag(&db, &schema, "broken").await);
    assert!(!exists(&db, "c").await);

    assert!(registry.get("a").unwrap().executed());
    assert!(!registry.get("broken").unwrap().executed());
    assert!(!registry.get("c").unwrap().executed());
}

#[tokio::test]
async fn test_empty_backward_sql_only_updates_ledger() {
    let irreversible: Box<dyn Migration> = Box::new(SqlMigration::new(
        "seed",
        1,
        "CREATE TABLE seed (id INT)",
        "",
    ));
    let (db, schema, mut registry) = setup(vec![irreversible]).await;
    run_batch(&db, &schema, &mut registry, &["seed".to_string()], Direction::Forward)
        .await
        .unwrap();

    let report = run_batch(&db, &schema, &mut registry, &["seed".to_string()], Direction::Backward)
        .await
        .unwrap();
    assert_eq!(report.executed, vec!["seed"]);
    assert!(exists(&db, "seed").await);
    assert!(!ledger_flag(&db, &schema, "seed").await);
}
