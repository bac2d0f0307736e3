//! services/app/src/adapters/storage.rs
//!
//! Concrete implementations of the `SessionStorage` port. `SqliteStorage` keeps
//! the session in an embedded SQLite database so it survives restarts;
//! `MemoryStorage` is the throwaway variant used by tests and one-shot runs.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::Arc;
use taskdeck_core::ports::{PortError, PortResult, SessionStorage};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

//=========================================================================================
// SQLite Storage
//=========================================================================================

/// Session storage backed by a single-connection SQLite pool.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Creates a new `SqliteStorage` over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and applies migrations.
    ///
    /// One connection only: `sqlite::memory:` databases are per-connection.
    pub async fn open(url: &str) -> Result<Self, StorageError> {
        debug!("Opening session database at {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        let storage = Self::new(pool);
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct EntryRecord {
    value: String,
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, EntryRecord>(
            "SELECT value FROM session_entries WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO session_entries (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM session_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// In-Memory Storage
//=========================================================================================

/// In-memory session storage for tests and runs that should not persist.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.get("access_token").await.unwrap(), None);

        storage.set("access_token", "abc").await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap().as_deref(), Some("abc"));

        storage.set("access_token", "def").await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap().as_deref(), Some("def"));

        storage.remove("access_token").await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap(), None);

        // Removing a missing key is not an error.
        storage.remove("access_token").await.unwrap();
    }

    #[tokio::test]
    async fn memory_storage_get_set_remove() {
        exercise(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn sqlite_storage_get_set_remove() {
        let storage = SqliteStorage::open("sqlite::memory:").await.unwrap();
        exercise(&storage).await;
    }

    #[tokio::test]
    async fn sqlite_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("session.db").display());

        let storage = SqliteStorage::open(&url).await.unwrap();
        storage.set("user", "{\"id\":1}").await.unwrap();
        storage.pool.close().await;

        let reopened = SqliteStorage::open(&url).await.unwrap();
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{\"id\":1}"));
    }
}
