//! Query catalog — named SQL statements loaded once at startup.
//!
//! The eight statements the record store needs ship bundled with the crate
//! (via `include_str!`); a directory of `.sql` files can be loaded instead
//! to override them. Read-only after load, safe to share across workers.

use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Immutable map of query name to SQL text
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    queries: HashMap<String, String>,
}

impl QueryCatalog {
    /// Catalog of the bundled statements
    pub fn bundled() -> Self {
        let mut queries = HashMap::new();

        queries.insert(
            "create_wakacraft_table".to_string(),
            include_str!("../sql/create_wakacraft_table.sql").to_string(),
        );
        queries.insert(
            "retrieve_wakacraft_by_id".to_string(),
            include_str!("../sql/retrieve_wakacraft_by_id.sql").to_string(),
        );
        queries.insert(
            "retrieve_wakacraft_by_name".to_string(),
            include_str!("../sql/retrieve_wakacraft_by_name.sql").to_string(),
        );
        queries.insert(
            "update_wakacraft_data_by_id".to_string(),
            include_str!("../sql/update_wakacraft_data_by_id.sql").to_string(),
        );
        queries.insert(
            "update_wakacraft_data_by_name".to_string(),
            include_str!("../sql/update_wakacraft_data_by_name.sql").to_string(),
        );
        queries.insert(
            "reset_wakacraft_data_by_id".to_string(),
            include_str!("../sql/reset_wakacraft_data_by_id.sql").to_string(),
        );
        queries.insert(
            "reset_wakacraft_data_by_name".to_string(),
            include_str!("../sql/reset_wakacraft_data_by_name.sql").to_string(),
        );
        queries.insert(
            "create_wakacraft_data".to_string(),
            include_str!("../sql/create_wakacraft_data.sql").to_string(),
        );

        QueryCatalog { queries }
    }

    /// Load every `.sql` file in a directory, keyed by file stem.
    ///
    /// Subdirectories and files with other extensions are skipped. Fails
    /// with an IO error if the directory cannot be read.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut queries = HashMap::new();

        for entry in std::fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
                continue;
            }

            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let sql = std::fs::read_to_string(&path)?;
            queries.insert(name, sql);
        }

        tracing::debug!(
            "Loaded {} queries from {}",
            queries.len(),
            dir.as_ref().display()
        );

        Ok(QueryCatalog { queries })
    }

    /// Look up a query by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.queries.get(name).map(String::as_str)
    }

    /// Look up a query the caller knows must exist
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| CoreError::UnknownQuery(name.to_string()))
    }

    /// Number of loaded queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
