//! SQLite adapter for preference storage.
//!
//! Preferences live in a single embedded database file inside the host's
//! data directory. Every operation borrows a pooled connection for exactly
//! one statement and is bounded by a timeout; a timeout is reported as
//! [`StorageError::Timeout`].

use crate::traits::PreferenceStore;
use crate::{Preference, StorageError, StorageResult};
use async_trait::async_trait;
use defaultserver_types::{PlayerId, ServerName};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File name of the preference database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "default_server.db";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS default_server (
        player_uuid VARCHAR(36) PRIMARY KEY,
        server_name VARCHAR(255) NOT NULL
    )
"#;

const SELECT_SERVER: &str = "SELECT server_name FROM default_server WHERE player_uuid = ?1";

const UPSERT_SERVER: &str = r#"
    INSERT INTO default_server (player_uuid, server_name)
    VALUES (?1, ?2)
    ON CONFLICT(player_uuid) DO UPDATE SET server_name = excluded.server_name
"#;

/// Connection parameters for [`SqlitePreferenceStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Database file path. Parent directories are created on connect.
    pub path: PathBuf,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Upper bound for a single storage operation, acquisition included.
    pub operation_timeout: Duration,
}

impl SqliteStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(10),
        }
    }

    /// Database at [`DATABASE_FILE_NAME`] inside `data_dir`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(DATABASE_FILE_NAME))
    }
}

/// SQLite-backed preference store.
#[derive(Clone)]
pub struct SqlitePreferenceStore {
    pool: SqlitePool,
    acquire_timeout: Duration,
    operation_timeout: Duration,
}

impl SqlitePreferenceStore {
    /// Open (creating if needed) the database and initialize the schema.
    pub async fn connect(config: SqliteStoreConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::Backend(format!(
                    "failed to open sqlite database {}: {e}",
                    config.path.display()
                ))
            })?;

        info!(path = %config.path.display(), "opened preference database");

        let store = Self {
            pool,
            acquire_timeout: config.acquire_timeout,
            operation_timeout: config.operation_timeout,
        };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight operations.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let outcome = tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(self.operation_timeout))?;
        outcome.map_err(|e| self.map_sqlx_error(operation, e))
    }

    fn map_sqlx_error(&self, operation: &'static str, error: sqlx::Error) -> StorageError {
        match error {
            sqlx::Error::PoolTimedOut => StorageError::Timeout(self.acquire_timeout),
            e => StorageError::Backend(format!("{operation} failed: {e}")),
        }
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn init_schema(&self) -> StorageResult<()> {
        self.bounded("schema init", async {
            let mut conn = self.pool.acquire().await?;
            sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
            Ok::<(), sqlx::Error>(())
        })
        .await
    }

    async fn get_preference(&self, player_id: &PlayerId) -> StorageResult<Option<ServerName>> {
        let key = player_id.to_string();
        let row = self
            .bounded(
                "preference lookup",
                sqlx::query(SELECT_SERVER).bind(key.as_str()).fetch_optional(&self.pool),
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("server_name").map_err(|e| StorageError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        let server = ServerName::new(raw).map_err(|e| StorageError::Corrupt {
            key,
            reason: e.to_string(),
        })?;
        Ok(Some(server))
    }

    async fn upsert_preference(&self, preference: Preference) -> StorageResult<()> {
        let key = preference.player_id.to_string();
        self.bounded(
            "preference upsert",
            sqlx::query(UPSERT_SERVER)
                .bind(key.as_str())
                .bind(preference.server.as_str())
                .execute(&self.pool),
        )
        .await?;
        debug!(player_id = %key, server = %preference.server, "stored preference");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn server(name: &str) -> ServerName {
        ServerName::new(name).unwrap()
    }

    async fn open(dir: &Path) -> SqlitePreferenceStore {
        SqlitePreferenceStore::connect(SqliteStoreConfig::in_data_dir(dir))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path()).await;
        let player = PlayerId::generate();

        assert_eq!(store.get_preference(&player).await.unwrap(), None);

        store
            .upsert_preference(Preference::new(player, server("lobby")))
            .await
            .unwrap();
        store
            .upsert_preference(Preference::new(player, server("survival")))
            .await
            .unwrap();

        assert_eq!(
            store.get_preference(&player).await.unwrap(),
            Some(server("survival"))
        );

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM default_server")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn preferences_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let player = PlayerId::generate();

        let store = open(dir.path()).await;
        store
            .upsert_preference(Preference::new(player, server("creative")))
            .await
            .unwrap();
        store.close().await;

        let reopened = open(dir.path()).await;
        assert_eq!(
            reopened.get_preference(&player).await.unwrap(),
            Some(server("creative"))
        );
    }

    #[tokio::test]
    async fn init_schema_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path()).await;
        store.init_schema().await.unwrap();
        store.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn creates_missing_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("plugins").join("defaultserver");
        let _store = open(&nested).await;
        assert!(nested.join(DATABASE_FILE_NAME).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_for_distinct_players_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open(dir.path()).await);
        let players: Vec<PlayerId> = (0..16).map(|_| PlayerId::generate()).collect();

        let mut handles = Vec::new();
        for (i, player) in players.iter().copied().enumerate() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let name = if i % 2 == 0 { "lobby" } else { "survival" };
                store
                    .upsert_preference(Preference::new(player, server(name)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for (i, player) in players.iter().enumerate() {
            let expected = if i % 2 == 0 { "lobby" } else { "survival" };
            assert_eq!(
                store.get_preference(player).await.unwrap(),
                Some(server(expected))
            );
        }
    }

    #[tokio::test]
    async fn pool_exhaustion_reports_the_acquire_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SqliteStoreConfig::in_data_dir(dir.path());
        config.acquire_timeout = Duration::from_millis(200);
        let store = SqlitePreferenceStore::connect(config).await.unwrap();

        let err = store.map_sqlx_error("preference lookup", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Timeout(d) if d == Duration::from_millis(200)));

        let err = store.map_sqlx_error("preference lookup", sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_for_one_player_leave_one_of_the_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open(dir.path()).await);
        let player = PlayerId::generate();
        let names = ["lobby", "survival", "creative", "hub"];

        let mut handles = Vec::new();
        for i in 0..64 {
            let store = Arc::clone(&store);
            let name = names[i % names.len()];
            handles.push(tokio::spawn(async move {
                store
                    .upsert_preference(Preference::new(player, server(name)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_preference(&player).await.unwrap().unwrap();
        assert!(names.contains(&stored.as_str()));
    }

    #[tokio::test]
    async fn unreadable_row_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path()).await;
        let player = PlayerId::generate();

        sqlx::query("INSERT INTO default_server (player_uuid, server_name) VALUES (?1, ?2)")
            .bind(player.to_string())
            .bind("   ")
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.get_preference(&player).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
