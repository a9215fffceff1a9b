//! Breathing session history

use rusqlite::params;

use super::{parse_timestamp, StorageError};
use crate::models::{BreathSessionRecord, Pattern};
use crate::storage::Database;

impl Database {
    /// Insert a breathing session and return its id
    pub fn insert_breath_session(&self, record: &BreathSessionRecord) -> Result<i64, StorageError> {
        self.connection().execute(
            "INSERT INTO breath_sessions (timestamp, completed, duration, pattern)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.timestamp.to_rfc3339(),
                record.completed,
                record.duration,
                record.pattern.as_str(),
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// List breathing sessions, newest first
    pub fn list_breath_sessions(&self) -> Result<Vec<BreathSessionRecord>, StorageError> {
        let mut stmt = self.connection().prepare(
            "SELECT id, timestamp, completed, duration, pattern
             FROM breath_sessions
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, timestamp, completed, duration, pattern) = row?;
            let pattern: Pattern = pattern.parse().map_err(|_| StorageError::CorruptRecord {
                id,
                reason: format!("unknown pattern '{}'", pattern),
            })?;
            records.push(BreathSessionRecord {
                id: Some(id),
                timestamp: parse_timestamp(id, &timestamp)?,
                completed,
                duration,
                pattern,
            });
        }
        Ok(records)
    }

    /// Delete a breathing session
    pub fn delete_breath_session(&self, id: i64) -> Result<(), StorageError> {
        let affected = self
            .connection()
            .execute("DELETE FROM breath_sessions WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::SessionNotFound(id));
        }
        Ok(())
    }
}
