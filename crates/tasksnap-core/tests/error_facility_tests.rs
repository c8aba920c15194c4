use tasksnap_core::errors::{ExError, ExErrorKind, SnapError};
use tasksnap_core::Snapshot;
use tasksnap_core_types::RequestId;

#[test]
fn test_invalid_snapshot_maps_to_invalid_input() {
    let err = SnapError::InvalidSnapshot {
        reason: "missing field `tasks`".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
    assert!(ex_err.message().contains("missing field"));
}

#[test]
fn test_empty_store_distinct_from_storage_failure() {
    let ex_err: ExError = SnapError::EmptyStore.into();

    assert_eq!(ex_err.kind(), ExErrorKind::EmptyStore);
    assert_eq!(ex_err.code(), "ERR_EMPTY_STORE");
    assert!(!ex_err.kind().is_storage_failure());
}

#[test]
fn test_storage_unavailable_keeps_message() {
    let ex_err: ExError = SnapError::StorageUnavailable {
        message: "pool exhausted".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::StorageUnavailable);
    assert_eq!(ex_err.message(), "pool exhausted");
}

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::EmptyStore, "ERR_EMPTY_STORE"),
        (ExErrorKind::StorageUnavailable, "ERR_STORAGE_UNAVAILABLE"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::ConstraintViolation, "ERR_CONSTRAINT_VIOLATION"),
        (ExErrorKind::Timeout, "ERR_TIMEOUT"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(seen.insert(expected_code), "duplicate code {}", expected_code);
    }
}

#[test]
fn test_bad_status_surfaces_as_invalid_snapshot() {
    let json = r#"{
        "schemaVersion": 1,
        "tasks": {
            "t1": {
                "id": "t1", "title": "A", "description": "", "priority": 1,
                "status": "blocked", "isBlocked": false, "isExternal": false,
                "dependsOn": []
            }
        }
    }"#;

    let err = Snapshot::from_json_str(json).unwrap_err();
    match err {
        SnapError::InvalidSnapshot { reason } => assert!(reason.contains("blocked")),
        other => panic!("expected InvalidSnapshot, got {:?}", other),
    }
}

#[test]
fn test_request_id_context_round_trips() {
    let request_id = RequestId::from_string("req-42".to_string());
    let err = ExError::new(ExErrorKind::Persistence)
        .with_op("insert_revision")
        .with_entity_id("snapshots")
        .with_request_id(request_id.clone());

    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(err.op(), Some("insert_revision"));
    assert_eq!(err.entity_id(), Some("snapshots"));
    assert!(err.to_string().contains("entity_id: snapshots"));
}
