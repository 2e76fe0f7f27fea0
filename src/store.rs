//! Record store — asynchronous persistence of per-player time records.
//!
//! Every public operation is a unit of work: the caller-facing API is
//! non-blocking, the query body runs on a blocking worker, and the number
//! of in-flight units is bounded by a semaphore sized from configuration.
//! Completion happens on a worker, not on the caller's thread.
//!
//! Known, accepted race: two concurrent `load` calls for the same
//! never-before-seen player can both observe "no row" and both insert. The
//! primary-key constraint makes exactly one succeed; the loser fails with a
//! query error and nothing is retried.

use crate::catalog::QueryCatalog;
use crate::connector::SqliteConnector;
use crate::error::{CoreError, Result};
use crate::model::{now_millis, Identity, TimeRecord};
use rusqlite::params;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task;
use uuid::Uuid;

/// Asynchronous store of per-player time records
pub struct RecordStore {
    connector: Arc<SqliteConnector>,
    catalog: Arc<QueryCatalog>,
    workers: Arc<Semaphore>,
    worker_count: usize,
}

impl RecordStore {
    /// Create the store and verify the backing schema exists.
    ///
    /// Runs `create_wakacraft_table` synchronously once; failure here is
    /// fatal, the store cannot operate without the schema.
    pub fn new(
        connector: Arc<SqliteConnector>,
        catalog: Arc<QueryCatalog>,
        worker_count: usize,
    ) -> Result<Self> {
        let worker_count = worker_count.max(1);

        let conn = connector.acquire()?;
        conn.execute_batch(catalog.require("create_wakacraft_table")?)?;
        drop(conn);

        tracing::debug!("Record store ready ({} workers)", worker_count);

        Ok(RecordStore {
            connector,
            catalog,
            workers: Arc::new(Semaphore::new(worker_count)),
            worker_count,
        })
    }

    /// Number of workers not currently executing a unit of work
    pub fn available_workers(&self) -> usize {
        self.workers.available_permits()
    }

    /// Configured worker pool size
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Load a player's record, creating it when none exists.
    ///
    /// Lookups use the explicit UUID when the identity carries one, the
    /// display name otherwise. A row found by name is normalized to the
    /// caller's derived key in the returned value.
    pub async fn load(&self, identity: &Identity) -> Result<TimeRecord> {
        if !self.connector.is_connected() {
            return Err(CoreError::NotConnected);
        }

        let query = if identity.unique_id().is_some() {
            self.catalog.require("retrieve_wakacraft_by_id")?
        } else {
            self.catalog.require("retrieve_wakacraft_by_name")?
        }
        .to_string();
        let create = self.catalog.require("create_wakacraft_data")?.to_string();

        let connector = self.connector.clone();
        let identity = identity.clone();
        let permit = self.dispatch().await?;

        task::spawn_blocking(move || {
            let _permit = permit;

            let key = identity.derived_key();
            let lookup = lookup_value(&identity);

            let conn = connector.acquire()?;
            let row = conn.query_row(&query, params![lookup], |row| {
                Ok((row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
            });

            match row {
                Ok((measure_time, created_at)) => Ok(TimeRecord::new(
                    key,
                    identity.name(),
                    measure_time,
                    created_at,
                )),
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    // Create-on-miss, inline within this unit of work so the
                    // nested insert never waits on a second worker slot.
                    let now = now_millis();
                    conn.execute(
                        &create,
                        params![key.to_string(), identity.name(), now, now],
                    )?;

                    tracing::debug!("Created record for {}", identity.name());
                    Ok(TimeRecord::new(key, identity.name(), now, now))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(|e| CoreError::Task(e.to_string()))?
    }

    /// Checkpoint a player's timer at `measure_time`.
    ///
    /// Matching zero rows is not distinguished from success; the record must
    /// have been created via `load` first for the update to take effect.
    pub async fn save(&self, identity: &Identity, measure_time: i64) -> Result<()> {
        let query = if identity.unique_id().is_some() {
            "update_wakacraft_data_by_id"
        } else {
            "update_wakacraft_data_by_name"
        };
        self.update(identity, query, measure_time).await
    }

    /// Rebase a player's timer to the current time.
    ///
    /// Only `measure_time` changes; `created_at` is left untouched, so the
    /// elapsed time right after a reset is near-zero, not exactly zero.
    pub async fn reset(&self, identity: &Identity) -> Result<()> {
        let query = if identity.unique_id().is_some() {
            "reset_wakacraft_data_by_id"
        } else {
            "reset_wakacraft_data_by_name"
        };
        self.update(identity, query, now_millis()).await
    }

    /// Insert a new record with `created_at = now`.
    ///
    /// Duplicate detection is left to the primary-key constraint; losing
    /// that race surfaces as a query error.
    pub async fn create(
        &self,
        unique_id: Uuid,
        name: &str,
        measure_time: i64,
    ) -> Result<TimeRecord> {
        if !self.connector.is_connected() {
            return Err(CoreError::NotConnected);
        }

        let create = self.catalog.require("create_wakacraft_data")?.to_string();
        let connector = self.connector.clone();
        let name = name.to_string();
        let permit = self.dispatch().await?;

        task::spawn_blocking(move || {
            let _permit = permit;

            let now = now_millis();
            let conn = connector.acquire()?;
            conn.execute(&create, params![unique_id.to_string(), name, measure_time, now])?;

            Ok(TimeRecord::new(unique_id, name, measure_time, now))
        })
        .await
        .map_err(|e| CoreError::Task(e.to_string()))?
    }

    /// Shared body of `save` and `reset`
    async fn update(&self, identity: &Identity, query_name: &str, measure_time: i64) -> Result<()> {
        if !self.connector.is_connected() {
            return Err(CoreError::NotConnected);
        }

        let query = self.catalog.require(query_name)?.to_string();

        let connector = self.connector.clone();
        let identity = identity.clone();
        let permit = self.dispatch().await?;

        task::spawn_blocking(move || {
            let _permit = permit;

            let conn = connector.acquire()?;
            conn.execute(&query, params![measure_time, lookup_value(&identity)])?;

            Ok(())
        })
        .await
        .map_err(|e| CoreError::Task(e.to_string()))?
    }

    /// Wait for a worker slot
    async fn dispatch(&self) -> Result<OwnedSemaphorePermit> {
        self.workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CoreError::Task(e.to_string()))
    }
}

/// The parameter driving a lookup: the UUID string when the identity carries
/// one, the display name otherwise
fn lookup_value(identity: &Identity) -> String {
    match identity.unique_id() {
        Some(id) => id.to_string(),
        None => identity.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::model::offline_key;

    fn test_store(dir: &tempfile::TempDir) -> (Arc<SqliteConnector>, RecordStore) {
        let connector = Arc::new(SqliteConnector::new(DatabaseConfig {
            path: dir.path().join("waka.db"),
            maximum_pool_size: 4,
            queries_dir: None,
        }));
        connector.connect().unwrap();

        let store = RecordStore::new(
            connector.clone(),
            Arc::new(QueryCatalog::bundled()),
            2,
        )
        .unwrap();

        (connector, store)
    }

    fn row_count(connector: &SqliteConnector) -> i64 {
        let conn = connector.acquire().unwrap();
        conn.query_row("SELECT COUNT(*) FROM wakacraft", [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_creates_on_miss() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, store) = test_store(&dir);

        let before = now_millis();
        let record = store.load(&Identity::by_name("alice")).await.unwrap();
        let after = now_millis();

        assert_eq!(record.name(), "alice");
        assert_eq!(record.unique_id(), offline_key("alice"));
        assert_eq!(record.measure_time(), record.created_at());
        assert!(record.created_at() >= before && record.created_at() <= after);
        assert_eq!(row_count(&connector), 1);
    }

    #[tokio::test]
    async fn test_second_load_returns_existing_row() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, store) = test_store(&dir);

        let first = store.load(&Identity::by_name("alice")).await.unwrap();
        let second = store.load(&Identity::by_name("alice")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(row_count(&connector), 1);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, store) = test_store(&dir);

        let identity = Identity::by_name("alice");
        let record = store.load(&identity).await.unwrap();

        let t = record.created_at() + 5_000;
        store.save(&identity, t).await.unwrap();

        let reloaded = store.load(&identity).await.unwrap();
        assert_eq!(reloaded.measure_time(), t);
        assert_eq!(reloaded.created_at(), record.created_at());
        assert_eq!(reloaded.formatted(), "5s");
    }

    #[tokio::test]
    async fn test_save_unknown_player_is_silent_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, store) = test_store(&dir);

        store.save(&Identity::by_name("ghost"), 42).await.unwrap();
        assert_eq!(row_count(&connector), 0);
    }

    #[tokio::test]
    async fn test_reset_keeps_created_at() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, store) = test_store(&dir);

        let identity = Identity::by_name("alice");
        let record = store.load(&identity).await.unwrap();

        store.save(&identity, record.created_at() + 60_000).await.unwrap();

        let before = now_millis();
        store.reset(&identity).await.unwrap();

        let reloaded = store.load(&identity).await.unwrap();
        assert_eq!(reloaded.created_at(), record.created_at());
        assert!(reloaded.measure_time() >= before);
        // Elapsed collapses back to near-zero (now - created_at), not zero
        assert!(reloaded.elapsed_millis() < 60_000);
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_derived_name_agree() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, store) = test_store(&dir);

        let by_name = store.load(&Identity::by_name("alice")).await.unwrap();

        let derived = offline_key("alice");
        let by_id = store
            .load(&Identity::by_id(derived, "alice"))
            .await
            .unwrap();

        assert_eq!(by_name.created_at(), by_id.created_at());
        assert_eq!(by_name.measure_time(), by_id.measure_time());
        assert_eq!(by_name.unique_id(), by_id.unique_id());
    }

    #[tokio::test]
    async fn test_load_by_name_normalizes_to_caller_key() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, store) = test_store(&dir);

        // Row keyed by an explicit UUID, later looked up by name only
        let id = Uuid::new_v4();
        store.load(&Identity::by_id(id, "alice")).await.unwrap();

        let by_name = store.load(&Identity::by_name("alice")).await.unwrap();
        assert_eq!(by_name.unique_id(), offline_key("alice"));
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, store) = test_store(&dir);

        let id = Uuid::new_v4();
        store.create(id, "alice", 1_000).await.unwrap();

        let err = store.create(id, "alice", 2_000).await.unwrap_err();
        assert!(matches!(err, CoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_operations_fail_fast_when_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, store) = test_store(&dir);
        connector.disconnect().unwrap();

        let identity = Identity::by_name("alice");
        let workers_before = store.available_workers();

        assert!(matches!(
            store.load(&identity).await.unwrap_err(),
            CoreError::NotConnected
        ));
        assert!(matches!(
            store.save(&identity, 42).await.unwrap_err(),
            CoreError::NotConnected
        ));
        assert!(matches!(
            store.reset(&identity).await.unwrap_err(),
            CoreError::NotConnected
        ));
        assert!(matches!(
            store.create(Uuid::new_v4(), "alice", 42).await.unwrap_err(),
            CoreError::NotConnected
        ));

        // The connectivity pre-check never consumed a worker slot
        assert_eq!(store.available_workers(), workers_before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_leave_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, store) = test_store(&dir);
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.load(&Identity::by_name("alice")).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            // Every caller completes; losers of the create race get a query
            // error, never a hang.
            match handle.await.unwrap() {
                Ok(record) => {
                    assert_eq!(record.name(), "alice");
                    successes += 1;
                }
                Err(CoreError::Query(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert!(successes >= 1);
        assert_eq!(row_count(&connector), 1);
    }
}
