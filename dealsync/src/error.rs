//! Sync error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error types
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to ingest {}: {message}", .path.display())]
    Ingestion { path: PathBuf, message: String },

    #[error("Remote request failed: {message}")]
    Remote { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shared error: {0}")]
    Shared(#[from] shared::SharedError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SyncError {
    pub fn ingestion(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SyncError::Ingestion { path: path.into(), message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config { message: message.into() }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        SyncError::Remote { message: message.into() }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        // The api token travels in the query string, keep it out of messages
        SyncError::Remote { message: err.without_url().to_string() }
    }
}
