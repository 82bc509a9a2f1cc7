//! Embedded SQLite database
//!
//! One pool for the whole server, opened in WAL mode so list endpoints keep
//! reading while writes commit. A background task truncates the WAL on an
//! interval; schema setup and versioned migrations live in the submodules.

pub mod error;
mod migrations;
pub mod repositories;
pub mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_CHECKPOINT_INTERVAL_SECS,
    SQLITE_DB_FILENAME, SQLITE_MAX_CONNECTIONS, SQLITE_WAL_AUTOCHECKPOINT,
};
use crate::core::storage::{AppStorage, DataSubdir};

fn connect_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
        .pragma("cache_size", SQLITE_CACHE_SIZE)
        .pragma("temp_store", "MEMORY")
        .pragma("wal_autocheckpoint", SQLITE_WAL_AUTOCHECKPOINT)
        .log_statements(LevelFilter::Trace)
}

/// Owns the connection pool and its maintenance tasks.
///
/// Built once at startup; route state clones the pool out of it.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (creating if needed) the database under the app data dir and
    /// bring the schema up to date.
    pub async fn init(storage: &AppStorage) -> Result<Self, SqliteError> {
        let db_path = storage.subdir(DataSubdir::Sqlite).join(SQLITE_DB_FILENAME);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(connect_options(&db_path))
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(path = %db_path.display(), "database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wrap an already-open pool, used by tests that run on :memory:
    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Force a full WAL truncation checkpoint
    pub async fn checkpoint(&self) -> Result<(), SqliteError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    /// Spawn the periodic checkpoint loop. Stops when the shutdown channel
    /// flips to true.
    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        let period = Duration::from_secs(SQLITE_CHECKPOINT_INTERVAL_SECS);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!("WAL checkpoint failed: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("checkpoint task stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkpoint_on_memory_pool() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let db = SqliteService::from_pool(pool);
        db.checkpoint().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_checkpoint_task_stops_on_shutdown() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let db = Arc::new(SqliteService::from_pool(pool));
        let (tx, rx) = watch::channel(false);

        let handle = db.start_checkpoint_task(rx);
        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
