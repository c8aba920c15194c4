// Wire-format tests for the snapshot model: the exact JSON clients send,
// rejection of malformed bodies, and structural round-trips.

use proptest::prelude::*;
use tasksnap_core::{Snapshot, SnapError, Task, TaskStatus};

const SINGLE_TASK: &str = r#"{
    "schemaVersion": 1,
    "tasks": {
        "t1": {
            "id": "t1",
            "title": "A",
            "description": "",
            "priority": 1,
            "status": "not started",
            "isBlocked": false,
            "isExternal": false,
            "dependsOn": []
        }
    }
}"#;

#[test]
fn test_client_payload_parses() {
    let snap = Snapshot::from_json_str(SINGLE_TASK).unwrap();

    assert_eq!(snap.schema_version, 1);
    let t1 = &snap.tasks["t1"];
    assert_eq!(t1.title, "A");
    assert_eq!(t1.priority, 1);
    assert_eq!(t1.status, TaskStatus::NotStarted);
    assert!(t1.depends_on.is_empty());
}

#[test]
fn test_dangling_dependency_is_kept() {
    let mut task = Task::new("t1", "A");
    task.depends_on = vec!["missing".to_string(), "t1".to_string()];
    let snap = Snapshot::new(1).with_task(task);

    let json = serde_json::to_string(&snap).unwrap();
    let back = Snapshot::from_json_str(&json).unwrap();

    assert_eq!(back.tasks["t1"].depends_on, vec!["missing", "t1"]);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let json = r#"{"schemaVersion": 3, "tasks": {}, "snapshot": "legacy"}"#;
    let snap = Snapshot::from_json_str(json).unwrap();
    assert_eq!(snap.schema_version, 3);
}

#[test]
fn test_wrong_types_rejected() {
    let cases = [
        r#"{"schemaVersion": "1", "tasks": {}}"#,
        r#"{"schemaVersion": 1, "tasks": []}"#,
        r#"{"schemaVersion": 1, "tasks": {"t1": {"id": "t1"}}}"#,
        r#"{"schemaVersion": 1.5, "tasks": {}}"#,
    ];
    for case in cases {
        let err = Snapshot::from_json_str(case).unwrap_err();
        assert!(
            matches!(err, SnapError::InvalidSnapshot { .. }),
            "expected rejection for {}",
            case
        );
    }
}

#[test]
fn test_complete_status_round_trips() {
    let json = SINGLE_TASK.replace("not started", "complete");
    let snap = Snapshot::from_json_str(&json).unwrap();
    assert!(snap.tasks["t1"].is_complete());

    let value = serde_json::to_value(&snap).unwrap();
    assert_eq!(value["tasks"]["t1"]["status"], "complete");
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-z0-9]{1,8}",
        ".{0,16}",
        ".{0,32}",
        any::<i64>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::vec("[a-z0-9]{1,8}", 0..4),
    )
        .prop_map(
            |(id, title, description, priority, complete, is_blocked, is_external, depends_on)| {
                Task {
                    id,
                    title,
                    description,
                    priority,
                    status: if complete {
                        TaskStatus::Complete
                    } else {
                        TaskStatus::NotStarted
                    },
                    is_blocked,
                    is_external,
                    depends_on,
                }
            },
        )
}

proptest! {
    #[test]
    fn prop_snapshot_json_round_trip(
        schema_version in any::<i64>(),
        tasks in proptest::collection::vec(arb_task(), 0..6),
    ) {
        let snap = tasks
            .into_iter()
            .fold(Snapshot::new(schema_version), Snapshot::with_task);

        let json = serde_json::to_vec(&snap).unwrap();
        let back = Snapshot::from_json_slice(&json).unwrap();

        prop_assert_eq!(back, snap);
    }
}
