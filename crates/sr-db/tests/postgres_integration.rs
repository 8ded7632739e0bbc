//! Live PostgreSQL tests for the gateway.
//!
//! Skipped unless `SQLRUN_TEST_DB_HOST` is set. The remaining connection
//! settings come from `SQLRUN_TEST_DB_PORT`, `SQLRUN_TEST_DB_USER`,
//! `SQLRUN_TEST_DB_PASSWORD` and `SQLRUN_TEST_DB_NAME`.

use sr_db::{transaction_body, Database, DbCredentials, DbError, DbOptions, PgGateway, Transaction};
use std::time::Duration;

fn test_credentials() -> Option<DbCredentials> {
    let host = std::env::var("SQLRUN_TEST_DB_HOST").ok()?;
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    Some(DbCredentials {
        host,
        port: var("SQLRUN_TEST_DB_PORT", "5432").parse().ok()?,
        user: var("SQLRUN_TEST_DB_USER", "postgres"),
        password: var("SQLRUN_TEST_DB_PASSWORD", "postgres"),
        database: var("SQLRUN_TEST_DB_NAME", "postgres"),
        cloud_sql_instance: None,
    })
}

async fn gateway() -> Option<PgGateway> {
    let creds = test_credentials()?;
    let options = DbOptions::default().with_timeout(Duration::from_secs(10));
    Some(PgGateway::connect_with_options(&creds, options).await.unwrap())
}

async fn count(db: &PgGateway, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_execute_multi_statement_script() {
    let Some(db) = gateway().await else {
        return;
    };
    db.execute(
        "DROP TABLE IF EXISTS sqlrun_it_multi; \
         CREATE TABLE sqlrun_it_multi(id int); \
         INSERT INTO sqlrun_it_multi VALUES (1), (2);",
    )
    .await
    .unwrap();

    assert_eq!(count(&db, "sqlrun_it_multi").await, 2);
    db.execute("DROP TABLE sqlrun_it_multi").await.unwrap();
}

#[tokio::test]
async fn test_execute_invalid_sql_is_execution_error() {
    let Some(db) = gateway().await else {
        return;
    };
    let err = db.execute("CREAT TABLE nope(id int)").await.unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(err.to_string().contains("unable to execute the sql on database"));
}

#[tokio::test]
async fn test_run_in_transaction_commits() {
    let Some(db) = gateway().await else {
        return;
    };
    db.execute("DROP TABLE IF EXISTS sqlrun_it_commit; CREATE TABLE sqlrun_it_commit(id int)")
        .await
        .unwrap();

    db.run_in_transaction(transaction_body(|tx| {
        Box::pin(async move { tx.execute("INSERT INTO sqlrun_it_commit VALUES (1)").await })
    }))
    .await
    .unwrap();

    assert_eq!(count(&db, "sqlrun_it_commit").await, 1);
    db.execute("DROP TABLE sqlrun_it_commit").await.unwrap();
}

#[tokio::test]
async fn test_run_in_transaction_rolls_back_on_failure() {
    let Some(db) = gateway().await else {
        return;
    };
    db.execute("DROP TABLE IF EXISTS sqlrun_it_rollback; CREATE TABLE sqlrun_it_rollback(id int)")
        .await
        .unwrap();

    let result = db
        .run_in_transaction(transaction_body(|tx| {
            Box::pin(async move {
                tx.execute("INSERT INTO sqlrun_it_rollback VALUES (1)").await?;
                tx.execute("INSERT INTO missing_table VALUES (1)").await
            })
        }))
        .await;

    assert!(result.is_err());
    assert_eq!(count(&db, "sqlrun_it_rollback").await, 0);
    db.execute("DROP TABLE sqlrun_it_rollback").await.unwrap();
}

#[tokio::test]
async fn test_transaction_runs_multi_statement_script() {
    let Some(db) = gateway().await else {
        return;
    };
    db.execute("DROP TABLE IF EXISTS sqlrun_it_tx_multi; CREATE TABLE sqlrun_it_tx_multi(id int)")
        .await
        .unwrap();

    let mut tx = db.begin().await.unwrap();
    tx.execute("INSERT INTO sqlrun_it_tx_multi VALUES (1); INSERT INTO sqlrun_it_tx_multi VALUES (2);")
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(count(&db, "sqlrun_it_tx_multi").await, 2);
    db.execute("DROP TABLE sqlrun_it_tx_multi").await.unwrap();
}

#[tokio::test]
async fn test_dropped_transaction_is_rolled_back() {
    let Some(db) = gateway().await else {
        return;
    };
    db.execute("DROP TABLE IF EXISTS sqlrun_it_drop; CREATE TABLE sqlrun_it_drop(id int)")
        .await
        .unwrap();

    {
        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO sqlrun_it_drop VALUES (1)").await.unwrap();
    }

    assert_eq!(count(&db, "sqlrun_it_drop").await, 0);
    db.execute("DROP TABLE sqlrun_it_drop").await.unwrap();
}
