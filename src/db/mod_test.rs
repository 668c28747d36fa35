use super::*;

#[tokio::test]
async fn memory_pool_seeds_exactly_one_default_preset() {
    let pool = init_memory_pool().await.unwrap();
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM grid_presets")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(ids, vec!["default".to_string()]);
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let pool = init_memory_pool().await.unwrap();
    migrate(&pool).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grid_presets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn designs_table_starts_empty() {
    let pool = init_memory_pool().await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM designs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn error_codes_are_stable() {
    let err = DbError::Database(sqlx::Error::RowNotFound);
    assert_eq!(err.error_code(), "E_DATABASE");
}
