//! Error types for twin-onboard.

/// Startup error: anything that stops the service from coming up.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Slot store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Interview session errors.
///
/// Extraction itself never fails; these only cover caller actions that the
/// current session state does not allow.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot confirm yet: {completed} of {required} required fields completed")]
    NotReady { completed: usize, required: usize },

    #[error("Expected step {expected}, but the interview is at {actual}")]
    NotAtStep { expected: String, actual: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
