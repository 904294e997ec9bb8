//! Tests for database initialization
//!
//! Covers automatic creation on first run and re-opening an existing file.

use vsp_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("vsp.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vsp.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO playback_records (user_id, record) VALUES ('u1', '{}')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.expect("Failed to open existing database");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playback_records")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_playback_records_schema() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("vsp.db")).await.unwrap();

    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('playback_records')")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert!(columns.contains(&"user_id".to_string()));
    assert!(columns.contains(&"record".to_string()));
    assert!(columns.contains(&"updated_at".to_string()));
}
