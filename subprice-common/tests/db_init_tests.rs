//! Integration tests for on-disk database initialization

use subprice_common::db::init::init_database;
use subprice_common::{NewRow, RowStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("subprice.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_rows_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("subprice.db");

    let store = RowStore::new(init_database(&db_path).await.unwrap());
    store
        .insert_many(&[NewRow {
            email: Some("a@example.com".to_string()),
            credit_score: Some(700.0),
            credit_lines: Some(3.0),
            ..NewRow::default()
        }])
        .await
        .unwrap();
    store.close().await;

    // Opening an existing database must keep its rows
    let reopened = RowStore::new(init_database(&db_path).await.unwrap());
    let rows = reopened.find_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email.as_deref(), Some("a@example.com"));
    assert_eq!(rows[0].credit_score, Some(700.0));
}
