use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::{Snapshot, TaskMap};

/// User id recorded on every revision when none is configured
pub const DEFAULT_USER_ID: &str = "sam";

/// A persisted, server-numbered snapshot revision
///
/// `id` and `created_at` are assigned by the store; everything else is
/// copied from the submitted snapshot. Revisions are never modified after
/// insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRevision {
    /// Monotonic revision number, never reused
    pub id: i64,

    /// The single implicit user this service stores for
    pub user_id: String,

    /// Copied verbatim from the submitted snapshot
    pub schema_version: i64,

    /// The submitted task map
    pub tasks: TaskMap,

    /// Server time at insert
    pub created_at: DateTime<Utc>,
}

impl StoredRevision {
    /// Consume the revision, keeping only the snapshot
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            schema_version: self.schema_version,
            tasks: self.tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn sample() -> StoredRevision {
        StoredRevision {
            id: 7,
            user_id: DEFAULT_USER_ID.to_string(),
            schema_version: 1,
            tasks: Snapshot::new(1).with_task(Task::new("t1", "A")).tasks,
            created_at: DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap(),
        }
    }

    #[test]
    fn test_revision_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["userId"], "sam");
        assert_eq!(value["schemaVersion"], 1);
        assert_eq!(value["tasks"]["t1"]["title"], "A");
        assert_eq!(value["createdAt"], "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_into_snapshot_keeps_tasks() {
        let snap = sample().into_snapshot();
        assert_eq!(snap.schema_version, 1);
        assert_eq!(snap.tasks["t1"].title, "A");
    }
}
