//! Error types for the cartable ecosystem.

use thiserror::Error;

/// Errors that can occur while syncing the timetable.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote calendar error: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cartable operations.
pub type SyncResult<T> = Result<T, SyncError>;
