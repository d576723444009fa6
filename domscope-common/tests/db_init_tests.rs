//! Tests for on-disk database initialization
//!
//! Opening a missing file creates it (and its parent directory) with the
//! schema; reopening keeps existing rows.

use domscope_common::db::init_database;
use tempfile::TempDir;

#[tokio::test]
async fn test_creates_database_and_parent_directory() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("domscope.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await.unwrap();

    assert!(db_path.exists());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domain_info")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_reopen_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("domscope.db");

    {
        let pool = init_database(&db_path).await.unwrap();
        sqlx::query(
            "INSERT INTO domain_info (id, domain_name, domain_type, created_at, updated_at) \
             VALUES ('1', 'example.com', 'ROOT', '', '')",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    let name: String = sqlx::query_scalar("SELECT domain_name FROM domain_info")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(name, "example.com");
}

#[tokio::test]
async fn test_rejects_unknown_domain_type() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("domscope.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO domain_info (id, domain_name, domain_type, created_at, updated_at) \
         VALUES ('1', 'example.com', 'APEX', '', '')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
