//! Repository layer for session history
//!
//! `impl Database` blocks for each record kind, plus shared row helpers.

mod breath;
mod grounding;

use chrono::{DateTime, Utc};

use super::error::StorageError;

/// Parse an RFC 3339 timestamp stored in a row
fn parse_timestamp(id: i64, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRecord {
            id,
            reason: format!("bad timestamp '{}': {}", raw, e),
        })
}
