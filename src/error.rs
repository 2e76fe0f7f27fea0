//! Error types for Wakacraft

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Connection provider has no live pool
    #[error("Connection is not available")]
    NotConnected,

    /// `connect()` called while a pool already exists
    #[error("Already connected")]
    AlreadyConnected,

    /// `disconnect()` called without a live pool
    #[error("Already disconnected")]
    AlreadyDisconnected,

    /// Query failure (wraps driver errors)
    #[error("Query failure: {0}")]
    Query(#[from] rusqlite::Error),

    /// Connection pool failure
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A query name the store expected was missing from the catalog.
    /// All names used by the store are known at compile time, so hitting
    /// this is a programming error, not a recoverable condition.
    #[error("Unknown query: {0}")]
    UnknownQuery(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Command dispatch error (unknown name, bad arguments)
    #[error("Command error: {0}")]
    Command(String),

    /// A unit of work could not run to completion on the worker pool
    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
