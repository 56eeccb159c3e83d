use super::*;
use chrono::TimeZone;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_new_handles_memory_path() {
    let db = DuckDbBackend::new(":memory:").unwrap();
    let mut tx = db.begin().await.unwrap();
    assert!(tx.is_open());
    tx.commit().await.unwrap();
    assert!(!tx.is_open());
}

#[tokio::test]
async fn test_execute_batch_and_table_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    tx.execute_batch("CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);")
        .await
        .unwrap();

    assert!(tx.table_exists("t1").await.unwrap());
    assert!(tx.table_exists("t2").await.unwrap());
    assert!(!tx.table_exists("nonexistent").await.unwrap());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_table_exists_is_case_sensitive_for_quoted_names() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    tx.execute_batch(r#"CREATE TABLE "_Migrations" ("Id" VARCHAR)"#)
        .await
        .unwrap();
    assert!(tx.table_exists("_Migrations").await.unwrap());
    assert!(tx.table_exists("main._Migrations").await.unwrap());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_execute_with_binds_returns_rows_affected() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    tx.execute_batch("CREATE TABLE items (id VARCHAR, qty BIGINT, active BOOLEAN, seen TIMESTAMP)")
        .await
        .unwrap();

    let seen = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let rs = tx
        .execute(
            "INSERT INTO items VALUES (?, ?, ?, ?)",
            &[
                Value::from("a"),
                Value::from(3_i64),
                Value::from(true),
                Value::from(seen),
            ],
        )
        .await
        .unwrap();
    assert_eq!(rs.rows_affected, 1);
    assert!(rs.rows.is_empty());

    let rs = tx
        .execute("UPDATE items SET qty = qty + 1 WHERE id = ?", &[Value::from("a")])
        .await
        .unwrap();
    assert_eq!(rs.rows_affected, 1);

    let rs = tx
        .execute("SELECT id, qty, active, seen FROM items", &[])
        .await
        .unwrap();
    assert_eq!(rs.rows.len(), 1);
    let row = rs.first().unwrap();
    assert_eq!(row.columns(), &["id", "qty", "active", "seen"]);
    assert_eq!(row.text("id").unwrap(), "a");
    assert_eq!(row.integer("qty").unwrap(), 4);
    assert_eq!(row.get("active").unwrap(), &Value::Boolean(true));
    assert_eq!(row.optional_timestamp("seen").unwrap(), Some(seen));
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_select_with_null_bind() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    tx.execute_batch("CREATE TABLE n (v VARCHAR)").await.unwrap();
    tx.execute("INSERT INTO n VALUES (?)", &[Value::Null])
        .await
        .unwrap();
    let rs = tx.execute("SELECT v FROM n", &[]).await.unwrap();
    assert_eq!(rs.first().unwrap().optional_text("v").unwrap(), None);
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_rollback_discards_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    {
        let mut tx = db.begin().await.unwrap();
        tx.execute_batch("CREATE TABLE keep (id INT)").await.unwrap();
        tx.commit().await.unwrap();
    }

    let mut tx = db.begin().await.unwrap();
    tx.execute("INSERT INTO keep VALUES (?)", &[Value::from(1_i64)])
        .await
        .unwrap();
    tx.rollback().await.unwrap();
    drop(tx);

    let mut tx = db.begin().await.unwrap();
    let rs = tx.execute("SELECT COUNT(*) AS n FROM keep", &[]).await.unwrap();
    assert_eq!(rs.first().unwrap().integer("n").unwrap(), 0);
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_drop_without_commit_rolls_back() {
    let db = DuckDbBackend::in_memory().unwrap();
    {
        let mut tx = db.begin().await.unwrap();
        tx.execute_batch("CREATE TABLE ghost (id INT)").await.unwrap();
    }

    let mut tx = db.begin().await.unwrap();
    assert!(!tx.table_exists("ghost").await.unwrap());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_failed_statement_then_rollback_allows_new_scope() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    let err = tx.execute_batch("SELECT * FROM missing_table").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
    tx.rollback().await.unwrap();
    drop(tx);

    let mut tx = db.begin().await.unwrap();
    tx.execute_batch("CREATE TABLE ok (id INT)").await.unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_finished_transaction_rejects_statements() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mut tx = db.begin().await.unwrap();
    tx.commit().await.unwrap();

    assert!(matches!(
        tx.execute("SELECT 1", &[]).await,
        Err(DbError::TransactionError(_))
    ));
    assert!(matches!(
        tx.commit().await,
        Err(DbError::TransactionError(_))
    ));
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        let mut tx = db.begin().await.unwrap();
        tx.execute_batch("CREATE TABLE persisted (id INT); INSERT INTO persisted VALUES (42);")
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    let db = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    let mut tx = db.begin().await.unwrap();
    let rs = tx.execute("SELECT id FROM persisted", &[]).await.unwrap();
    assert_eq!(rs.first().unwrap().integer("id").unwrap(), 42);
    tx.commit().await.unwrap();
}

#[test]
fn test_returns_rows_detection() {
    assert!(returns_rows("SELECT 1"));
    assert!(returns_rows("  with x as (select 1) select * from x"));
    assert!(returns_rows("(SELECT 1)"));
    assert!(returns_rows("pragma table_info('t')"));
    assert!(!returns_rows("INSERT INTO t VALUES (1)"));
    assert!(!returns_rows("UPDATE t SET a = 1"));
    assert!(!returns_rows("CREATE TABLE t (id INT)"));
    assert!(!returns_rows(""));
}

#[test]
fn test_duck_value_conversion() {
    assert_eq!(from_duck_value(DuckValue::Int(5)), Value::Integer(5));
    assert_eq!(from_duck_value(DuckValue::HugeInt(7)), Value::Integer(7));
    assert_eq!(
        from_duck_value(DuckValue::UBigInt(u64::MAX)),
        Value::Text(u64::MAX.to_string())
    );
    let ts = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(from_duck_value(to_duck_value(&Value::Timestamp(ts))), Value::Timestamp(ts));
    assert_eq!(
        timestamp_value(TimeUnit::Second, ts.timestamp()),
        Value::Timestamp(ts)
    );
}
