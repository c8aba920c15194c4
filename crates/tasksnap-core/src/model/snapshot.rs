use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::errors::Result;

/// Tasks keyed by id
///
/// Key order carries no meaning; a `BTreeMap` keeps serialization stable.
pub type TaskMap = BTreeMap<String, Task>;

/// A complete point-in-time view of a client's tasks
///
/// `schema_version` is supplied by the client and never interpreted by the
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: i64,
    pub tasks: TaskMap,
}

impl Snapshot {
    /// Create an empty snapshot for the given schema version
    pub fn new(schema_version: i64) -> Self {
        Self {
            schema_version,
            tasks: TaskMap::new(),
        }
    }

    /// Add a task keyed by its own id, replacing any task with the same id
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.insert(task.id.clone(), task);
        self
    }

    /// Parse a snapshot from JSON text
    ///
    /// # Errors
    /// Returns `SnapError::InvalidSnapshot` for malformed JSON, missing
    /// fields, wrong types or an unknown `status` value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a snapshot from JSON bytes
    ///
    /// # Errors
    /// Same as [`Snapshot::from_json_str`].
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Number of tasks in the snapshot
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SnapError;

    #[test]
    fn test_parse_minimal_snapshot() {
        let snap = Snapshot::from_json_str(r#"{"schemaVersion": 2, "tasks": {}}"#).unwrap();
        assert_eq!(snap.schema_version, 2);
        assert_eq!(snap.task_count(), 0);
    }

    #[test]
    fn test_missing_tasks_is_invalid() {
        let err = Snapshot::from_json_str(r#"{"schemaVersion": 1}"#).unwrap_err();
        assert!(matches!(err, SnapError::InvalidSnapshot { .. }));
    }

    #[test]
    fn test_syntax_error_is_invalid() {
        let err = Snapshot::from_json_slice(b"{not json").unwrap_err();
        assert!(matches!(err, SnapError::InvalidSnapshot { .. }));
    }

    #[test]
    fn test_with_task_keys_by_id() {
        let snap = Snapshot::new(1).with_task(Task::new("t1", "A"));
        assert!(snap.tasks.contains_key("t1"));
    }
}
