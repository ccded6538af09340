//! Repository for tool settings
//!
//! Key-value settings such as the submission endpoint URL and the default
//! inspector identity used to prefill the form.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Submission endpoint URL
pub const ENDPOINT_URL: &str = "endpoint_url";
/// Default inspector name used to prefill new forms
pub const INSPECTOR_NAME: &str = "inspector_name";
/// Default inspector designation used to prefill new forms
pub const INSPECTOR_DESIGNATION: &str = "inspector_designation";

/// All known setting keys, in display order
pub const KNOWN_KEYS: &[&str] = &[ENDPOINT_URL, INSPECTOR_NAME, INSPECTOR_DESIGNATION];

/// Get a setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get setting '{}'", key))?;

    Ok(row.map(|(value,)| value))
}

/// Set a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to set setting '{}'", key))?;

    log::debug!("Set setting: {} = {}", key, value);
    Ok(())
}

/// Delete a setting, returning whether it existed
pub async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete setting '{}'", key))?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db;

    #[tokio::test]
    async fn test_setting_operations() {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        assert_eq!(get_setting(&pool, "endpoint_url").await.unwrap(), None);

        set_setting(&pool, "endpoint_url", "https://example.com/api/submissions")
            .await
            .unwrap();
        assert_eq!(
            get_setting(&pool, "endpoint_url").await.unwrap(),
            Some("https://example.com/api/submissions".to_string())
        );

        set_setting(&pool, "endpoint_url", "https://other.example.com")
            .await
            .unwrap();
        assert_eq!(
            get_setting(&pool, "endpoint_url").await.unwrap(),
            Some("https://other.example.com".to_string())
        );

        assert!(delete_setting(&pool, "endpoint_url").await.unwrap());
        assert!(!delete_setting(&pool, "endpoint_url").await.unwrap());
    }
}
