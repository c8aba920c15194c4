use tasksnap_core_types::RequestId;
use thiserror::Error;

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs, in the HTTP error
/// envelope, and by tests that assert on failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,

    // Read outcomes
    /// No revision has been stored yet
    EmptyStore,

    // Storage
    /// The datastore cannot be reached (pool exhausted, database unopenable)
    StorageUnavailable,
    Persistence,
    Serialization,
    ConstraintViolation,

    // Runtime
    Timeout,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::EmptyStore => "ERR_EMPTY_STORE",
            ExErrorKind::StorageUnavailable => "ERR_STORAGE_UNAVAILABLE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for failures of the storage medium rather than of the caller's input
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            ExErrorKind::StorageUnavailable
                | ExErrorKind::Persistence
                | ExErrorKind::Serialization
                | ExErrorKind::ConstraintViolation
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling plus optional
/// context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised while handling snapshots
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapError {
    /// Submitted JSON does not have the Snapshot / Task shape
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// No revision has been stored yet
    #[error("No snapshot has been stored yet")]
    EmptyStore,

    /// The datastore could not be reached
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// A value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<SnapError> for ExError {
    fn from(err: SnapError) -> Self {
        match err {
            SnapError::InvalidSnapshot { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid snapshot: {}", reason)),

            SnapError::EmptyStore => ExError::new(ExErrorKind::EmptyStore)
                .with_message("No snapshot has been stored yet"),

            SnapError::StorageUnavailable { message } => {
                ExError::new(ExErrorKind::StorageUnavailable).with_message(message)
            }

            SnapError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Syntax and shape problems belong to the caller; I/O failures while
/// reading or writing JSON do not.
impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => SnapError::Serialization {
                message: err.to_string(),
            },
            _ => SnapError::InvalidSnapshot {
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failure_classification() {
        assert!(ExErrorKind::Persistence.is_storage_failure());
        assert!(ExErrorKind::StorageUnavailable.is_storage_failure());
        assert!(!ExErrorKind::InvalidInput.is_storage_failure());
        assert!(!ExErrorKind::EmptyStore.is_storage_failure());
    }

    #[test]
    fn test_display_includes_code_op_and_message() {
        let err = ExError::new(ExErrorKind::Persistence)
            .with_op("insert_revision")
            .with_message("disk I/O error");
        assert_eq!(
            err.to_string(),
            "[ERR_PERSISTENCE] in operation 'insert_revision': disk I/O error"
        );
    }

    #[test]
    fn test_request_id_none_by_default() {
        let err = ExError::new(ExErrorKind::Internal);
        assert!(err.request_id().is_none());
        assert!(err.op().is_none());
    }
}
