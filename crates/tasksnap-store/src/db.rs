//! Database connection management
//!
//! Opening and configuring SQLite connections, and `Pool`, a fixed set of
//! configured connections handed out one at a time and returned on drop.

use crate::errors::{from_rusqlite, storage_unavailable, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tasksnap_core::errors::{ExError, ExErrorKind};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    Connection::open(path).map_err(|e| {
        storage_unavailable(
            "open_database",
            format!("cannot open {}: {}", path.display(), e),
        )
    })
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection with the settings every pooled connection uses
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;

    // Writers wait for each other instead of failing with SQLITE_BUSY
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;

    // WAL lets readers proceed while a writer holds the lock. In-memory
    // databases answer "memory" and stay as they are.
    let _mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Open, configure and migrate a single connection
///
/// For one-shot tools that do not need a [`Pool`].
///
/// # Errors
///
/// Same as [`Pool::open`].
pub fn open_migrated<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Connection> {
    let mut conn = open(path)?;
    configure(&conn, busy_timeout)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Sizing and timeouts for a [`Pool`]
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Number of connections opened up front
    pub max_connections: usize,
    /// How long `acquire` waits for a free connection
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before giving up
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    size: usize,
}

impl PoolInner {
    fn idle(&self) -> std::sync::MutexGuard<'_, Vec<Connection>> {
        // A panic while holding the lock cannot leave the Vec half-updated
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-size pool of configured, migrated SQLite connections
///
/// Cloning is cheap; clones share the same connections. Every permit of the
/// internal semaphore corresponds to one idle connection, so a caller that
/// holds a permit always finds a connection to take.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Open `max_connections` connections to the database file at `path`
    /// and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if the file cannot be opened
    /// - `Persistence` / `ConstraintViolation` if migrations fail
    pub fn open<P: AsRef<Path>>(path: P, options: PoolOptions) -> Result<Self> {
        let path = path.as_ref();
        let size = options.max_connections.max(1);

        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = open(path)?;
            configure(&conn, options.busy_timeout)?;
            connections.push(conn);
        }
        apply_migrations(&mut connections[0])?;

        tracing::info!(
            path = %path.display(),
            max_connections = size,
            "Opened connection pool"
        );

        Ok(Self::from_connections(connections, options.acquire_timeout))
    }

    /// Open a migrated in-memory database
    ///
    /// Each in-memory connection is its own database, so the pool always
    /// holds exactly one connection regardless of `options.max_connections`.
    ///
    /// # Errors
    ///
    /// Same as [`Pool::open`].
    pub fn in_memory(options: PoolOptions) -> Result<Self> {
        let mut conn = open_in_memory()?;
        configure(&conn, options.busy_timeout)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connections(vec![conn], options.acquire_timeout))
    }

    fn from_connections(connections: Vec<Connection>, acquire_timeout: Duration) -> Self {
        let size = connections.len();
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                permits: Arc::new(Semaphore::new(size)),
                acquire_timeout,
                size,
            }),
        }
    }

    /// Borrow a connection, waiting up to the acquire timeout
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if no connection frees up in time.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let permit = tokio::time::timeout(
            self.inner.acquire_timeout,
            self.inner.permits.clone().acquire_owned(),
        )
        .await
        .map_err(|_| {
            storage_unavailable(
                "pool_acquire",
                format!(
                    "no database connection available within {} ms",
                    self.inner.acquire_timeout.as_millis()
                ),
            )
        })?
        .map_err(|_| storage_unavailable("pool_acquire", "connection pool is closed"))?;

        self.checkout(permit)
    }

    /// Borrow a connection only if one is idle right now
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if every connection is in use.
    pub fn try_acquire(&self) -> Result<PooledConnection> {
        let permit = self
            .inner
            .permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| storage_unavailable("pool_acquire", "all connections are in use"))?;

        self.checkout(permit)
    }

    fn checkout(&self, permit: OwnedSemaphorePermit) -> Result<PooledConnection> {
        let conn = self.inner.idle().pop().ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("pool_acquire")
                .with_message("permit granted but no idle connection")
        })?;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Total number of connections owned by the pool
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Number of connections not currently borrowed
    pub fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }
}

/// A connection borrowed from a [`Pool`]
///
/// Dereferences to `rusqlite::Connection`. Dropping it (normally, on error
/// return, or while unwinding) puts the connection back before the permit
/// is released.
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    // Dropped after `Drop::drop` has returned the connection
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection is present until drop"))
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .unwrap_or_else(|| unreachable!("connection is present until drop"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.idle().push(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_in_memory() {
        let conn = open_in_memory().unwrap();
        configure(&conn, Duration::from_millis(100)).unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_open_migrated_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_migrated(dir.path().join("snap.db"), Duration::from_millis(100)).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'snapshots'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_in_memory_pool_has_one_connection() {
        let pool = Pool::in_memory(PoolOptions {
            max_connections: 8,
            ..PoolOptions::default()
        })
        .unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_try_acquire_exhaustion_and_release() {
        let pool = Pool::in_memory(PoolOptions::default()).unwrap();

        let held = pool.try_acquire().unwrap();
        assert_eq!(pool.idle_count(), 0);
        assert!(pool.try_acquire().is_err());

        drop(held);
        assert_eq!(pool.idle_count(), 1);
        assert!(pool.try_acquire().is_ok());
    }
}
