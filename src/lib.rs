//! Wakacraft - service tracking cumulative active session time per player
//!
//! This crate provides the core functionality for Wakacraft:
//! - Asynchronous per-player time record persistence over pooled SQLite
//! - Named SQL statements bundled with the crate, overridable from disk
//! - An in-memory registry of currently-active players
//! - Explicit command dispatch for the get/set/reset surface
//!
//! # Usage
//!
//! ```ignore
//! use wakacraft::{Config, Core, Identity};
//!
//! let config = Config::from_file("~/.wakacraft/config.toml").unwrap();
//! let core = Core::new(config).unwrap();
//! // core.store().load(&Identity::by_name("alice")).await.unwrap();
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod connector;
pub mod error;
pub mod handler;
pub mod model;
pub mod registry;
pub mod store;

// Re-export main types for convenience
pub use catalog::QueryCatalog;
pub use config::Config;
pub use connector::SqliteConnector;
pub use error::{CoreError, Result};
pub use model::{Identity, TimeRecord};
pub use registry::SessionRegistry;
pub use store::RecordStore;

use commands::CommandRegistry;
use handler::SessionHandler;
use std::sync::Arc;

/// Core service that wires the connector, store, and registry together.
///
/// All collaborators are passed down explicitly; nothing reaches for an
/// ambient singleton.
pub struct Core {
    /// Configuration
    pub config: Config,

    connector: Arc<SqliteConnector>,
    store: Arc<RecordStore>,
    registry: Arc<SessionRegistry>,
}

impl Core {
    /// Connect to the database and build the record store.
    ///
    /// Fails if the pool cannot be established or the schema cannot be
    /// verified; there is nothing useful to run without either.
    pub fn new(config: Config) -> Result<Self> {
        let connector = Arc::new(SqliteConnector::new(config.database.clone()));
        connector.connect()?;

        let catalog = match &config.database.queries_dir {
            Some(dir) => QueryCatalog::load_from_dir(config::expand_path(dir))?,
            None => QueryCatalog::bundled(),
        };

        let store = Arc::new(RecordStore::new(
            connector.clone(),
            Arc::new(catalog),
            config.database.maximum_pool_size as usize,
        )?);

        Ok(Core {
            config,
            connector,
            store,
            registry: Arc::new(SessionRegistry::new()),
        })
    }

    /// Get a reference to the record store
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Get a reference to the connection provider
    pub fn connector(&self) -> &Arc<SqliteConnector> {
        &self.connector
    }

    /// Build the session event handler over this core's store and registry
    pub fn session_handler(&self) -> SessionHandler {
        SessionHandler::new(self.store.clone(), self.registry.clone())
    }

    /// Build the command registry with the standard command set
    pub fn command_registry(&self) -> CommandRegistry {
        CommandRegistry::with_defaults(self.store.clone())
    }

    /// Release the connection pool.
    ///
    /// In-flight store operations are not awaited; they may fail with
    /// connection errors, which callers treat as best-effort.
    pub fn shutdown(&self) -> Result<()> {
        self.connector.disconnect()
    }
}
