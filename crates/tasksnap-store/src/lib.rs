//! tasksnap store - append-only SQLite persistence for task-list snapshots
//!
//! Provides:
//! - Connection configuration and a fixed-size connection pool
//! - Embedded SQL migrations with checksums
//! - Revision insert / latest queries over a single `snapshots` table
//! - `SnapshotStore`, the async facade used by the HTTP layer

pub mod db;
pub mod errors;
pub mod migrations;
pub mod snapshot;
pub mod store;

// Re-export key types
pub use db::{Pool, PoolOptions, PooledConnection};
pub use errors::Result;
pub use store::SnapshotStore;
