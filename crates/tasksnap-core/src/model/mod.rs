//! Snapshot data model
//!
//! A `Snapshot` is what clients submit; a `StoredRevision` is what the store
//! keeps. Field names on the wire are camelCase.

pub mod revision;
pub mod snapshot;
pub mod task;

pub use revision::{StoredRevision, DEFAULT_USER_ID};
pub use snapshot::{Snapshot, TaskMap};
pub use task::{Task, TaskStatus};
