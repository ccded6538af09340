//! Repository for score-card record operations
//!
//! Records are stored as one JSON mapping per key. The draft slot and
//! submissions share the same table; the draft key is a reserved constant
//! that never collides with a submission id.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// Save or overwrite the record stored under `key`
pub async fn put(pool: &SqlitePool, key: &str, mapping: &Value) -> Result<()> {
    let payload = mapping.to_string();

    sqlx::query(
        r#"
        INSERT INTO records (record_key, payload, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(record_key) DO UPDATE SET
            payload = excluded.payload,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(&payload)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save record '{}'", key))?;

    log::debug!("Saved record: {}", key);
    Ok(())
}

/// Get the record stored under `key`
///
/// Errors if the stored payload is not valid JSON; callers treat that as a
/// corrupted entry and skip it.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT payload FROM records WHERE record_key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get record '{}'", key))?;

    match row {
        Some((payload,)) => {
            let mapping: Value = serde_json::from_str(&payload)
                .with_context(|| format!("Corrupted payload for record '{}'", key))?;
            Ok(Some(mapping))
        }
        None => Ok(None),
    }
}

/// Delete the record stored under `key`, returning whether it existed
pub async fn delete(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM records WHERE record_key = ?")
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete record '{}'", key))?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        log::debug!("Deleted record: {}", key);
    }

    Ok(deleted)
}

/// List all record keys
pub async fn keys(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT record_key FROM records ORDER BY record_key")
            .fetch_all(pool)
            .await
            .context("Failed to list record keys")?;

    Ok(rows.into_iter().map(|(key,)| key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db;
    use serde_json::json;

    async fn test_pool() -> SqlitePool {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let pool = test_pool().await;

        let mapping = json!({"location": "Sample Station", "isSynced": false});
        put(&pool, "SUB-1", &mapping).await.unwrap();

        let loaded = get(&pool, "SUB-1").await.unwrap();
        assert_eq!(loaded, Some(mapping.clone()));

        // Overwrite
        let updated = json!({"location": "Sample Station", "isSynced": true});
        put(&pool, "SUB-1", &updated).await.unwrap();
        let loaded = get(&pool, "SUB-1").await.unwrap();
        assert_eq!(loaded, Some(updated));

        assert!(delete(&pool, "SUB-1").await.unwrap());
        assert!(!delete(&pool, "SUB-1").await.unwrap());
        assert_eq!(get(&pool, "SUB-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys() {
        let pool = test_pool().await;

        put(&pool, "SUB-2", &json!({})).await.unwrap();
        put(&pool, "SUB-1", &json!({})).await.unwrap();
        put(&pool, "draft", &json!({})).await.unwrap();

        let all = keys(&pool).await.unwrap();
        assert_eq!(all, vec!["SUB-1", "SUB-2", "draft"]);
    }

    #[tokio::test]
    async fn test_get_corrupted_payload_errors() {
        let pool = test_pool().await;

        sqlx::query("INSERT INTO records (record_key, payload) VALUES (?, ?)")
            .bind("SUB-bad")
            .bind("{not json")
            .execute(&pool)
            .await
            .unwrap();

        assert!(get(&pool, "SUB-bad").await.is_err());
    }
}
