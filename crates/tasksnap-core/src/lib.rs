//! tasksnap core - task-list snapshot model and shared facilities
//!
//! This crate provides:
//! - The Task / Snapshot / StoredRevision data model and its JSON wire format
//! - The structured error facility (`ExError`, `ExErrorKind`, `SnapError`)
//! - The logging facility (`init`, `log_op_*!` macros, test capture)

pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-exported so the logging macros resolve schema constants through `$crate`
pub use tasksnap_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, SnapError};
pub use model::{Snapshot, StoredRevision, Task, TaskMap, TaskStatus, DEFAULT_USER_ID};

#[doc(hidden)]
pub use tracing;
