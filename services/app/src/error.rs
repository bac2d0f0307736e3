//! services/app/src/error.rs
//!
//! Defines the primary error type for the client application.

use crate::adapters::http::ClientError;
use crate::adapters::storage::StorageError;
use crate::config::ConfigError;

/// The primary error type for the `app` crate.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a failure talking to the remote task service.
    #[error("HTTP client error: {0}")]
    Client(#[from] ClientError),

    /// Represents a failure of the local session storage.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Represents a standard Input/Output error (e.g., reading a prompt from stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input given on the command line.
    #[error("{0}")]
    Usage(String),
}
