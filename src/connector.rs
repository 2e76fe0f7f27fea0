//! Connection provider — lifecycle of the pooled SQLite connections.
//!
//! Wraps an `r2d2` pool so workers take scoped connections that return to
//! the pool on drop, on every exit path. Fails closed: any acquire while
//! disconnected is an error.

use crate::config::DatabaseConfig;
use crate::error::{CoreError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::sync::RwLock;

/// A scoped connection, returned to the pool when dropped
pub type Connection = PooledConnection<SqliteConnectionManager>;

/// Pooled SQLite connection provider
pub struct SqliteConnector {
    config: DatabaseConfig,
    pool: RwLock<Option<Pool<SqliteConnectionManager>>>,
}

impl SqliteConnector {
    /// Create a provider in the disconnected state
    pub fn new(config: DatabaseConfig) -> Self {
        SqliteConnector {
            config,
            pool: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Establish the pool from configuration.
    ///
    /// Calling this twice without an intervening `disconnect()` is a
    /// programming error.
    pub fn connect(&self) -> Result<()> {
        let mut guard = self.pool.write().unwrap();

        if guard.is_some() {
            return Err(CoreError::AlreadyConnected);
        }

        let path = crate::config::expand_path(&self.config.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // WAL and a busy timeout so concurrent workers queue on the write
        // lock instead of erroring
        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder()
            .max_size(self.config.maximum_pool_size.max(1))
            .build(manager)?;

        tracing::info!(
            "Connected to {} (pool size {})",
            path.display(),
            self.config.maximum_pool_size.max(1)
        );

        *guard = Some(pool);
        Ok(())
    }

    /// Release the pool.
    ///
    /// In-flight operations holding a connection may fail with
    /// connection-closed errors; that is accepted, shutdown does not await
    /// them.
    pub fn disconnect(&self) -> Result<()> {
        let mut guard = self.pool.write().unwrap();

        if guard.take().is_none() {
            return Err(CoreError::AlreadyDisconnected);
        }

        tracing::info!("Disconnected from {}", self.config.path.display());
        Ok(())
    }

    /// True only while a live pool exists
    pub fn is_connected(&self) -> bool {
        self.pool.read().unwrap().is_some()
    }

    /// Take a pooled connection, or `NotConnected` when no pool is live.
    ///
    /// Blocks up to the pool's checkout timeout when all connections are
    /// busy, then errors.
    pub fn acquire(&self) -> Result<Connection> {
        let guard = self.pool.read().unwrap();

        match guard.as_ref() {
            Some(pool) => Ok(pool.get()?),
            None => Err(CoreError::NotConnected),
        }
    }
}
