//! Configuration management for Wakacraft
//!
//! Loads settings from TOML file at ~/.wakacraft/config.toml

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Data directory (defaults to ~/.wakacraft)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".wakacraft"))
        .unwrap_or_else(|| PathBuf::from(".wakacraft"))
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (default: ~/.wakacraft/wakacraft.db)
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum connections in the pool; also sizes the store's worker pool
    /// (default: 2)
    #[serde(default = "default_pool_size")]
    pub maximum_pool_size: u32,

    /// Optional directory of `.sql` files overriding the bundled queries
    #[serde(default)]
    pub queries_dir: Option<PathBuf>,
}

fn default_db_path() -> PathBuf {
    default_data_dir().join("wakacraft.db")
}

fn default_pool_size() -> u32 {
    2
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_db_path(),
            maximum_pool_size: default_pool_size(),
            queries_dir: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Load configuration from file or use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|p| p.join(".wakacraft").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".wakacraft/config.toml"))
    }

    /// Get the data directory, expanding ~ if present
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    /// Get the database file path, expanding ~ if present
    pub fn db_path(&self) -> PathBuf {
        expand_path(&self.database.path)
    }

    /// Apply environment variable overrides.
    ///
    /// An unparseable `WAKACRAFT_MAX_POOL_SIZE` leaves the configured value
    /// in place rather than failing startup.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("WAKACRAFT_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("WAKACRAFT_MAX_POOL_SIZE") {
            if let Ok(size) = size.parse() {
                self.database.maximum_pool_size = size;
            }
        }
        if let Ok(data_dir) = std::env::var("WAKACRAFT_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        // Write a well-commented config file
        let content = r#"# Wakacraft Configuration

[database]
# Path to the SQLite database file
path = "~/.wakacraft/wakacraft.db"

# Maximum connections in the pool. Also sizes the worker pool that
# executes store operations.
maximum_pool_size = 2

# Directory of .sql files overriding the bundled queries
# queries_dir = "~/.wakacraft/sql"
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap());
        }
    }
    path.to_path_buf()
}
