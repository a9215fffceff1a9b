//! Storage module error types
//!
//! Provides error types for database operations.

use thiserror::Error;

/// Storage operation error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(i64),

    /// Stored value could not be read back
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },

    /// Lock error when accessing database
    #[error("Database lock error")]
    LockError,
}
