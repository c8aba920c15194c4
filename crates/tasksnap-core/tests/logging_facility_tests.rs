#![allow(clippy::unwrap_used, clippy::expect_used)]

use tasksnap_core::errors::SnapError;
use tasksnap_core::logging_facility::test_capture::init_test_capture;
use tasksnap_core::{log_op_end, log_op_error, log_op_start};
use tasksnap_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR_CODE,
    FIELD_ERR_KIND, FIELD_TASK_COUNT,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, task_count = 2);

    let starts: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert_eq!(starts.len(), 1, "Should have exactly one start event");
    assert_eq!(starts[0].field(FIELD_TASK_COUNT), Some("2"));
    assert!(starts[0]
        .field(FIELD_COMPONENT)
        .unwrap()
        .contains("logging_facility_tests"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let ends: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(ends.len(), 1, "Should have exactly one end event");
    assert_eq!(ends[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    log_op_error!(op_name, SnapError::EmptyStore, duration_ms = 10);

    let errors: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, tracing::Level::ERROR);
    assert_eq!(errors[0].field(FIELD_ERR_KIND), Some("EmptyStore"));
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_EMPTY_STORE"));
}

#[test]
fn test_start_then_end_pairing() {
    let capture = init_test_capture();
    let op_name = "test_pairing_unique_4";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 1, revision_id = 5);

    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
    assert_eq!(
        capture.count_events(|e| e.op.as_deref() == Some(op_name)),
        2
    );
}
