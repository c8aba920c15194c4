use serde::{Deserialize, Serialize};

/// Completion state of a task
///
/// Only two states exist on the wire: `"not started"` and `"complete"`.
/// Any other string is rejected during deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "complete")]
    Complete,
}

impl TaskStatus {
    /// Wire representation of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item
///
/// `depends_on` lists other task ids in caller order. The ids are not
/// resolved here; a dependency on a task absent from the snapshot is kept
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: TaskStatus,
    pub is_blocked: bool,
    pub is_external: bool,
    pub depends_on: Vec<String>,
}

impl Task {
    /// Create a task with the same defaults the web client uses for a new row
    ///
    /// # Arguments
    /// * `id` - Task identifier, unique within its snapshot
    /// * `title` - Human-readable title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority: 3,
            status: TaskStatus::NotStarted,
            is_blocked: false,
            is_external: false,
            depends_on: Vec::new(),
        }
    }

    /// Check if this task is complete
    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Complete
    }
}
