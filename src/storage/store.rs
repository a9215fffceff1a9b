//! Session persistence collaborator
//!
//! The exercise controllers only see [`SessionStore`]; the SQLite-backed
//! [`SqliteStore`] is what the server wires in.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::database::Database;
use super::error::StorageError;
use crate::models::{BreathSessionRecord, GroundingSessionRecord};

/// save / list / delete over one kind of session record
pub trait SessionStore<R>: Send + Sync {
    /// Persist a record, returning its id
    fn save(&self, record: &R) -> Result<i64, StorageError>;

    /// All stored records, newest first
    fn list(&self) -> Result<Vec<R>, StorageError>;

    fn delete(&self, id: i64) -> Result<(), StorageError>;
}

/// Shared SQLite history store for both exercises
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) the database file at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(Database::new(path)?))
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Database::new_in_memory()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StorageError> {
        self.db.lock().map_err(|_| StorageError::LockError)
    }
}

impl SessionStore<BreathSessionRecord> for SqliteStore {
    fn save(&self, record: &BreathSessionRecord) -> Result<i64, StorageError> {
        self.lock()?.insert_breath_session(record)
    }

    fn list(&self) -> Result<Vec<BreathSessionRecord>, StorageError> {
        self.lock()?.list_breath_sessions()
    }

    fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.lock()?.delete_breath_session(id)
    }
}

impl SessionStore<GroundingSessionRecord> for SqliteStore {
    fn save(&self, record: &GroundingSessionRecord) -> Result<i64, StorageError> {
        self.lock()?.insert_grounding_session(record)
    }

    fn list(&self) -> Result<Vec<GroundingSessionRecord>, StorageError> {
        self.lock()?.list_grounding_sessions()
    }

    fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.lock()?.delete_grounding_session(id)
    }
}
