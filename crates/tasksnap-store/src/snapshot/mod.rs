//! Snapshot revision persistence.
//!
//! ## Responsibilities
//!
//! - Append revisions to the `snapshots` table
//! - Assign ids (SQLite AUTOINCREMENT) and insert timestamps
//! - Read back the latest revision
//!
//! ## Non-Responsibilities
//!
//! - Validating task content beyond its JSON shape
//! - Connection pooling and async dispatch (handled by `crate::store`)

pub mod persist;
pub mod query;

// Re-export primary functions
pub use persist::insert_revision;
pub use query::{latest_revision, revision_count};
