//! Read-only revision queries.
//!
//! `id` is the authoritative order: the latest revision is the row with
//! the greatest id, whatever its timestamp.

use crate::errors::{from_rusqlite, serialization_error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tasksnap_core::{StoredRevision, TaskMap};

/// A raw row from the `snapshots` table.
#[derive(Debug, Clone)]
struct RevisionRow {
    id: i64,
    user_id: String,
    schema_version: i64,
    tasks_blob: String,
    created_at: i64,
}

impl RevisionRow {
    /// Decode the stored JSON and timestamp
    ///
    /// A row that fails to decode is reported, never skipped.
    fn into_revision(self) -> Result<StoredRevision> {
        let tasks: TaskMap = serde_json::from_str(&self.tasks_blob).map_err(|e| {
            serialization_error("latest_revision", e).with_entity_id(self.id.to_string())
        })?;

        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or_else(|| {
            serialization_error(
                "latest_revision",
                format!("created_at {} ms is out of range", self.created_at),
            )
            .with_entity_id(self.id.to_string())
        })?;

        Ok(StoredRevision {
            id: self.id,
            user_id: self.user_id,
            schema_version: self.schema_version,
            tasks,
            created_at,
        })
    }
}

/// Fetch the revision with the greatest id.
///
/// Returns `Ok(None)` when nothing has been stored yet.
///
/// # Errors
///
/// - `ExErrorKind::Persistence`: the query failed
/// - `ExErrorKind::Serialization`: the stored row could not be decoded
pub fn latest_revision(conn: &Connection) -> Result<Option<StoredRevision>> {
    let row = conn
        .query_row(
            r#"
            SELECT id, user_id, schema_version, tasks_blob, created_at
            FROM snapshots
            ORDER BY id DESC
            LIMIT 1
            "#,
            [],
            |row| {
                Ok(RevisionRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    schema_version: row.get(2)?,
                    tasks_blob: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(|e| from_rusqlite(e).with_op("latest_revision"))?;

    row.map(RevisionRow::into_revision).transpose()
}

/// Count stored revisions.
///
/// # Errors
///
/// `ExErrorKind::Persistence` if the query fails.
pub fn revision_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
        .map_err(|e| from_rusqlite(e).with_op("revision_count"))
}
