//! Revision insert.
//!
//! Every call appends exactly one row; nothing here updates or deletes.

use crate::errors::{from_rusqlite, serialization_error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use tasksnap_core::{Snapshot, StoredRevision};

/// Append a snapshot as a new revision.
///
/// Runs in an IMMEDIATE transaction so the write lock is held before the
/// timestamp is chosen. The timestamp is clamped to the latest stored
/// `created_at`, which keeps `created_at` order identical to `id` order even
/// if the wall clock steps backwards.
///
/// ## Arguments
///
/// - `conn`: Database connection
/// - `user_id`: The service's single user id, recorded on the row
/// - `snapshot`: Snapshot to persist; its `tasks` map is stored as JSON
///
/// ## Returns
///
/// The stored revision with its assigned `id` and `created_at`
///
/// ## Errors
///
/// - `ExErrorKind::Serialization`: tasks could not be encoded
/// - `ExErrorKind::StorageUnavailable`: database busy or locked past the busy timeout
/// - `ExErrorKind::Persistence` / `ConstraintViolation`: the insert was rejected
pub fn insert_revision(
    conn: &mut Connection,
    user_id: &str,
    snapshot: Snapshot,
) -> Result<StoredRevision> {
    let tasks_blob = serde_json::to_string(&snapshot.tasks)
        .map_err(|e| serialization_error("insert_revision", e))?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| from_rusqlite(e).with_op("insert_revision"))?;

    let latest_created_at: Option<i64> = tx
        .query_row("SELECT MAX(created_at) FROM snapshots", [], |row| row.get(0))
        .map_err(|e| from_rusqlite(e).with_op("insert_revision"))?;

    let created_at_ms = next_created_at(Utc::now().timestamp_millis(), latest_created_at);
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms).ok_or_else(|| {
        serialization_error(
            "insert_revision",
            format!("timestamp {} ms is out of range", created_at_ms),
        )
    })?;

    tx.execute(
        r#"
        INSERT INTO snapshots (user_id, schema_version, tasks_blob, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        rusqlite::params![user_id, snapshot.schema_version, tasks_blob, created_at_ms],
    )
    .map_err(|e| from_rusqlite(e).with_op("insert_revision"))?;

    let id = tx.last_insert_rowid();

    tx.commit()
        .map_err(|e| from_rusqlite(e).with_op("insert_revision"))?;

    tracing::debug!(
        revision_id = id,
        task_count = snapshot.tasks.len(),
        schema_version = snapshot.schema_version,
        "Inserted snapshot revision"
    );

    Ok(StoredRevision {
        id,
        user_id: user_id.to_string(),
        schema_version: snapshot.schema_version,
        tasks: snapshot.tasks,
        created_at,
    })
}

/// Insert time for a new row: now, but never before the newest existing row
fn next_created_at(now_ms: i64, latest_ms: Option<i64>) -> i64 {
    latest_ms.map_or(now_ms, |latest| now_ms.max(latest))
}
