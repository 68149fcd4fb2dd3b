use levelgrid_core::db::migrations::{apply_migrations, latest_version};
use levelgrid_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn fresh_database_is_at_latest_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(latest_version() > 0);
}

#[test]
fn reapplying_migrations_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_database_schema_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, latest_version() + 1);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("expected UnsupportedSchemaVersion, got {other}"),
    }
}

#[test]
fn initial_migration_creates_all_matrix_tables() {
    let conn = open_db_in_memory().unwrap();
    for table in [
        "job_levels",
        "criteria",
        "capabilities",
        "edit_history",
        "overview_content",
    ] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "missing table {table}");
    }
}

#[test]
fn file_database_keeps_version_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("matrix.db");

    drop(open_db(&db_path).unwrap());

    let conn = open_db(&db_path).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}
