//! Error handling for tasksnap-store
//!
//! Wraps tasksnap-core ExError with store-specific helpers

use rusqlite::ErrorCode;
use tasksnap_core::errors::{ExError, ExErrorKind, SnapError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create an error for a migration recorded in the database but unknown to this build
pub fn unknown_migration(migration_id: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Database has migration {} which this build does not know; refusing to run against a newer schema",
            migration_id
        ))
}

/// Create a serialization error for the given operation
pub fn serialization_error(op: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op)
        .with_message(err.to_string())
}

/// Create an error for a datastore that cannot be reached or opened
pub fn storage_unavailable(op: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::from(SnapError::StorageUnavailable {
        message: reason.to_string(),
    })
    .with_op(op)
}

/// Create a database error from rusqlite::Error
///
/// Busy, locked and unopenable databases are reported as unavailable; SQL
/// constraint failures (including the append-only trigger) as constraint
/// violations; everything else as a persistence failure.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen => {
                return storage_unavailable("sqlite", &err);
            }
            ErrorCode::ConstraintViolation => ExErrorKind::ConstraintViolation,
            _ => ExErrorKind::Persistence,
        },
        _ => ExErrorKind::Persistence,
    };

    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_persistence() {
        let err = from_rusqlite(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.op(), Some("sqlite"));
    }

    #[test]
    fn test_storage_unavailable_helper() {
        let err = storage_unavailable("pool_acquire", "all connections are in use");
        assert_eq!(err.kind(), ExErrorKind::StorageUnavailable);
        assert_eq!(err.op(), Some("pool_acquire"));
        assert_eq!(err.message(), "all connections are in use");
    }

    #[test]
    fn test_busy_is_unavailable() {
        let err = from_rusqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert_eq!(err.kind(), ExErrorKind::StorageUnavailable);
        assert_eq!(err.op(), Some("sqlite"));
    }
}
