//! Async snapshot store.
//!
//! `SnapshotStore` is what the HTTP layer talks to. Each call borrows a
//! pooled connection and runs the synchronous query on tokio's blocking
//! pool, so a slow disk never stalls the async workers.

use crate::db::Pool;
use crate::errors::Result;
use crate::snapshot::{insert_revision, latest_revision};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Instant;
use tasksnap_core::errors::{ExError, ExErrorKind};
use tasksnap_core::{log_op_end, log_op_error, log_op_start, Snapshot, StoredRevision};

/// Append-only snapshot store backed by a connection pool
#[derive(Clone)]
pub struct SnapshotStore {
    pool: Pool,
    user_id: Arc<str>,
}

impl SnapshotStore {
    /// Create a store that records `user_id` on every revision
    pub fn new(pool: Pool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: Arc::from(user_id.into()),
        }
    }

    /// The pool this store draws connections from
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The user id recorded on new revisions
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Append `snapshot` as a new revision.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if no connection is free within the acquire timeout
    /// - any error of [`insert_revision`]
    pub async fn insert(&self, snapshot: Snapshot) -> Result<StoredRevision> {
        let started = Instant::now();
        log_op_start!(
            "snapshot_insert",
            task_count = snapshot.task_count(),
            schema_version = snapshot.schema_version
        );

        let user_id = self.user_id.clone();
        let result = self
            .with_connection("snapshot_insert", move |conn| {
                insert_revision(conn, &user_id, snapshot)
            })
            .await;

        let duration_ms = elapsed_ms(started);
        match &result {
            Ok(revision) => {
                log_op_end!(
                    "snapshot_insert",
                    duration_ms = duration_ms,
                    revision_id = revision.id
                );
            }
            Err(err) => {
                log_op_error!("snapshot_insert", err.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    /// Fetch the revision with the greatest id, or `None` if the store is empty.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if no connection is free within the acquire timeout
    /// - any error of [`latest_revision`]
    pub async fn get_latest(&self) -> Result<Option<StoredRevision>> {
        let started = Instant::now();
        log_op_start!("snapshot_get_latest");

        let result = self
            .with_connection("snapshot_get_latest", |conn| latest_revision(conn))
            .await;

        let duration_ms = elapsed_ms(started);
        match &result {
            Ok(latest) => {
                log_op_end!(
                    "snapshot_get_latest",
                    duration_ms = duration_ms,
                    found = latest.is_some()
                );
            }
            Err(err) => {
                log_op_error!("snapshot_get_latest", err.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`.
    ///
    /// The connection moves into the blocking task and goes back to the pool
    /// when the task finishes, including when `f` panics.
    async fn with_connection<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut conn = self.pool.acquire().await.map_err(|e| e.with_op(op))?;

        tokio::task::spawn_blocking(move || f(&mut *conn))
            .await
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op(op)
                    .with_message(format!("blocking task failed: {}", e))
            })?
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
