//! Grounding session history
//!
//! Step responses are stored as one JSON document per session.

use rusqlite::params;

use super::{parse_timestamp, StorageError};
use crate::models::{GroundingSessionRecord, GroundingStepResponse};
use crate::storage::Database;

impl Database {
    /// Insert a grounding session and return its id
    pub fn insert_grounding_session(
        &self,
        record: &GroundingSessionRecord,
    ) -> Result<i64, StorageError> {
        let responses = serde_json::to_string(&record.responses)?;
        self.connection().execute(
            "INSERT INTO grounding_sessions (timestamp, responses) VALUES (?1, ?2)",
            params![record.timestamp.to_rfc3339(), responses],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// List grounding sessions, newest first
    pub fn list_grounding_sessions(&self) -> Result<Vec<GroundingSessionRecord>, StorageError> {
        let mut stmt = self.connection().prepare(
            "SELECT id, timestamp, responses
             FROM grounding_sessions
             ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, timestamp, responses) = row?;
            let responses: Vec<GroundingStepResponse> = serde_json::from_str(&responses)?;
            records.push(GroundingSessionRecord {
                id: Some(id),
                timestamp: parse_timestamp(id, &timestamp)?,
                responses,
            });
        }
        Ok(records)
    }

    /// Delete a grounding session
    pub fn delete_grounding_session(&self, id: i64) -> Result<(), StorageError> {
        let affected = self
            .connection()
            .execute("DELETE FROM grounding_sessions WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::SessionNotFound(id));
        }
        Ok(())
    }
}
