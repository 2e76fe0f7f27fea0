//! Session event layer — bridges connect/disconnect events to the store
//! and the session registry.
//!
//! Mirrors the store's best-effort contract: registry membership is updated
//! whether or not the persistence call succeeded, and failures are logged
//! rather than retried.

use crate::error::Result;
use crate::model::{now_millis, Identity, TimeRecord};
use crate::registry::SessionRegistry;
use crate::store::RecordStore;
use std::sync::Arc;

/// Handles session lifecycle events for tracked players
pub struct SessionHandler {
    store: Arc<RecordStore>,
    registry: Arc<SessionRegistry>,
}

impl SessionHandler {
    pub fn new(store: Arc<RecordStore>, registry: Arc<SessionRegistry>) -> Self {
        SessionHandler { store, registry }
    }

    /// A player's session started: load (creating on first sight) and mark
    /// them active.
    pub async fn handle_connect(&self, identity: &Identity) -> Result<TimeRecord> {
        let result = self.store.load(identity).await;

        self.registry.add(identity.name());

        if let Err(e) = &result {
            tracing::error!("Failed to load record for {}: {}", identity.name(), e);
        }

        result
    }

    /// A player's session ended: checkpoint their timer at now and mark
    /// them inactive.
    pub async fn handle_disconnect(&self, identity: &Identity) -> Result<()> {
        let result = self.store.save(identity, now_millis()).await;

        self.registry.remove(identity.name());

        if let Err(e) = &result {
            tracing::error!("Failed to save record for {}: {}", identity.name(), e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QueryCatalog;
    use crate::config::DatabaseConfig;
    use crate::connector::SqliteConnector;
    use crate::error::CoreError;
    use uuid::Uuid;

    fn test_handler(dir: &tempfile::TempDir) -> (Arc<SqliteConnector>, SessionHandler) {
        let connector = Arc::new(SqliteConnector::new(DatabaseConfig {
            path: dir.path().join("waka.db"),
            maximum_pool_size: 2,
            queries_dir: None,
        }));
        connector.connect().unwrap();

        let store = Arc::new(
            RecordStore::new(connector.clone(), Arc::new(QueryCatalog::bundled()), 2).unwrap(),
        );
        let handler = SessionHandler::new(store, Arc::new(SessionRegistry::new()));

        (connector, handler)
    }

    #[tokio::test]
    async fn test_connect_creates_record_and_marks_active() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, handler) = test_handler(&dir);

        let identity = Identity::by_id(Uuid::new_v4(), "alice");
        let record = handler.handle_connect(&identity).await.unwrap();

        assert_eq!(record.name(), "alice");
        assert!(handler.registry.contains("alice"));
    }

    #[tokio::test]
    async fn test_disconnect_checkpoints_and_marks_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let (_connector, handler) = test_handler(&dir);

        let identity = Identity::by_id(Uuid::new_v4(), "alice");
        let record = handler.handle_connect(&identity).await.unwrap();

        handler.handle_disconnect(&identity).await.unwrap();
        assert!(!handler.registry.contains("alice"));

        let reloaded = handler.store.load(&identity).await.unwrap();
        assert!(reloaded.measure_time() >= record.measure_time());
        assert_eq!(reloaded.created_at(), record.created_at());
    }

    #[tokio::test]
    async fn test_registry_updated_even_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, handler) = test_handler(&dir);
        connector.disconnect().unwrap();

        let identity = Identity::by_name("alice");
        let err = handler.handle_connect(&identity).await.unwrap_err();
        assert!(matches!(err, CoreError::NotConnected));
        assert!(handler.registry.contains("alice"));

        let err = handler.handle_disconnect(&identity).await.unwrap_err();
        assert!(matches!(err, CoreError::NotConnected));
        assert!(!handler.registry.contains("alice"));
    }
}
