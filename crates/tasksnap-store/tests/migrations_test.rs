// Integration tests for the migration framework

use rusqlite::Connection;
use tasksnap_core::ExErrorKind;
use tasksnap_store::migrations::{applied_migrations, apply_migrations};

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = apply_migrations(&mut conn);
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    let tables = get_table_names(&conn);
    assert_eq!(
        tables,
        vec!["schema_version", "snapshots", "sqlite_sequence"],
        "sqlite_sequence is created by AUTOINCREMENT"
    );
}

#[test]
fn test_reapply_is_noop() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(applied_migrations(&conn).unwrap(), vec!["001_snapshots"]);
}

#[test]
fn test_tampered_checksum_fails() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_snapshots'",
        [],
    )
    .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert_eq!(err.op(), Some("migration_checksum"));
    assert_eq!(err.entity_id(), Some("001_snapshots"));
}

#[test]
fn test_unknown_migration_from_newer_build_fails() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES ('999_future', 0, NULL)",
        [],
    )
    .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert_eq!(err.entity_id(), Some("999_future"));
}

#[test]
fn test_tasks_blob_must_be_json() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO snapshots (user_id, schema_version, tasks_blob, created_at) VALUES ('sam', 1, 'not json', 0)",
        [],
    );
    assert!(result.is_err(), "CHECK(json_valid) should reject the row");
}
