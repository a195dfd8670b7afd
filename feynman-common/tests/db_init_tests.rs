//! Tests for database initialization
//!
//! - Automatic database creation on first run
//! - Idempotent re-open of an existing database
//! - Default settings seeding
//! - Foreign-key cascades from course down to review sessions

use feynman_common::db::init::{get_setting, init_database, init_memory_database, set_setting};
use feynman_common::db::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("feynman.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("feynman.db");

    let pool1 = init_database(&db_path).await.unwrap();
    set_setting(&pool1, "llm_api_key", "sk-test").await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    let pool2 = pool2.unwrap();
    assert_eq!(
        get_setting(&pool2, "llm_api_key").await.unwrap().as_deref(),
        Some("sk-test")
    );
    assert_eq!(get_schema_version(&pool2).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let pool = init_memory_database().await.unwrap();

    assert_eq!(
        get_setting(&pool, "db_max_lock_wait_ms").await.unwrap().as_deref(),
        Some("5000")
    );
    assert!(get_setting(&pool, "missing_key").await.unwrap().is_none());
}

#[tokio::test]
async fn test_null_setting_reset_to_default() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query("UPDATE settings SET value = NULL WHERE key = 'db_max_lock_wait_ms'")
        .execute(&pool)
        .await
        .unwrap();

    feynman_common::db::init::init_schema(&pool).await.unwrap();

    assert_eq!(
        get_setting(&pool, "db_max_lock_wait_ms").await.unwrap().as_deref(),
        Some("5000")
    );
}

#[tokio::test]
async fn test_course_delete_cascades_to_all_children() {
    let pool = init_memory_database().await.unwrap();

    for sql in [
        "INSERT INTO courses (id, name, created_at) VALUES ('c1', 'Biology', '2026-01-01T00:00:00Z')",
        "INSERT INTO lectures (id, course_id, name, raw_text, created_at) VALUES ('l1', 'c1', 'Plants', 'text', '2026-01-01T00:00:00Z')",
        "INSERT INTO concepts (id, lecture_id, name, description, created_at) VALUES ('k1', 'l1', 'Photosynthesis', 'desc', '2026-01-01T00:00:00Z')",
        "INSERT INTO review_lifecycle (id, concept_id, audience_level, state, started_at) VALUES ('s1', 'k1', 'Child', 'Active', '2026-01-01T00:00:00Z')",
        "INSERT INTO review_sessions (id, concept_id, audience_level, transcript, created_at) VALUES ('s0', 'k1', 'Child', '[]', '2026-01-01T00:00:00Z')",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }

    sqlx::query("DELETE FROM courses WHERE id = 'c1'")
        .execute(&pool)
        .await
        .unwrap();

    for table in ["lectures", "concepts", "review_lifecycle", "review_sessions"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{} rows survived course deletion", table);
    }
}

#[tokio::test]
async fn test_concept_status_check_constraint() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query("INSERT INTO courses (id, name, created_at) VALUES ('c1', 'Biology', 'now')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO lectures (id, course_id, name, raw_text, created_at) VALUES ('l1', 'c1', 'Plants', 'text', 'now')")
        .execute(&pool)
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO concepts (id, lecture_id, name, description, status, created_at) VALUES ('k1', 'l1', 'n', 'd', 'Expert', 'now')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unknown status must be rejected");
}
