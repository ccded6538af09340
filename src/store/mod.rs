//! SQLite-backed record store for score-card data
//!
//! This module provides persistent storage for:
//! - The single autosaved draft (reserved key, overwritten on each save)
//! - Submitted score-cards keyed by submission id
//! - Tool settings (endpoint URL, default inspector identity)
//!
//! The store contract consumed by the sync coordinator is the [`RecordStore`]
//! trait; [`SqliteStore`] is the production implementation. Every mutation is
//! broadcast on a change stream so live views can refresh.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::sync::broadcast;

pub mod db;
pub mod migrations;
pub mod repository;

/// A change to the record store, carrying the affected key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Put(String),
    Deleted(String),
}

/// Key-value contract the sync coordinator runs against
///
/// Durability: a completed `put` survives process restart. No multi-key
/// atomicity; each record is updated independently.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, key: &str, mapping: &Value) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn keys(&self) -> Result<Vec<String>>;
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// SQLite-backed store with a broadcast change stream
pub struct SqliteStore {
    pub(crate) pool: sqlx::SqlitePool,
    db_path: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteStore {
    /// Get the path to the SQLite database file
    pub fn get_db_path() -> Result<PathBuf> {
        let data_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("scorecard-cli")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".scorecard-cli")
        };

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
            log::info!("Created data directory: {:?}", data_dir);
        }

        Ok(data_dir.join("scorecard.db"))
    }

    /// Open the store at the default location, running migrations
    pub async fn open() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        log::debug!("Opening record store at: {:?}", db_path);

        let pool = db::connect(&db_path).await?;
        db::run_migrations(&pool).await?;

        let (events, _) = broadcast::channel(64);

        Ok(Self { pool, db_path, events })
    }

    /// Open an in-memory store for testing
    pub async fn open_memory() -> Result<Self> {
        let pool = db::connect_memory().await?;
        db::run_migrations(&pool).await?;

        let (events, _) = broadcast::channel(64);

        Ok(Self {
            pool,
            db_path: PathBuf::from(":memory:"),
            events,
        })
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Direct pool access for maintenance and tests
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    /// Close the underlying connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        log::debug!("Closed record store");
    }

    fn notify(&self, event: StoreEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    // Settings accessors (not part of the RecordStore contract)

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        repository::settings::get_setting(&self.pool, key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        repository::settings::set_setting(&self.pool, key, value).await
    }

    pub async fn delete_setting(&self, key: &str) -> Result<bool> {
        repository::settings::delete_setting(&self.pool, key).await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn put(&self, key: &str, mapping: &Value) -> Result<()> {
        repository::records::put(&self.pool, key, mapping).await?;
        self.notify(StoreEvent::Put(key.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        repository::records::get(&self.pool, key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let deleted = repository::records::delete(&self.pool, key).await?;
        if deleted {
            self.notify(StoreEvent::Deleted(key.to_string()));
        }
        Ok(deleted)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        repository::records::keys(&self.pool).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_change_notifications() {
        let store = SqliteStore::open_memory().await.unwrap();
        let mut events = store.subscribe();

        store.put("SUB-1", &json!({"isSynced": false})).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Put("SUB-1".to_string()));

        store.delete("SUB-1").await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Deleted("SUB-1".to_string()));

        // Deleting a missing key emits nothing
        store.delete("SUB-1").await.unwrap();
        store.put("SUB-2", &json!({})).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Put("SUB-2".to_string()));
    }

    #[tokio::test]
    async fn test_put_survives_reopen_on_same_pool() {
        let store = SqliteStore::open_memory().await.unwrap();
        store.put("SUB-1", &json!({"trainNo": "12309"})).await.unwrap();

        let loaded = store.get("SUB-1").await.unwrap().unwrap();
        assert_eq!(loaded["trainNo"], "12309");
        assert_eq!(store.keys().await.unwrap(), vec!["SUB-1"]);
    }
}
