use dayplan_core::db::{
    open_db, open_db_in_memory, schema_version, StoreError, REQUIRED_TABLES, SCHEMA_VERSION,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_every_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    for table in REQUIRED_TABLES {
        assert_table_exists(&conn, table);
    }
    assert_column_exists(&conn, "recurring_items", "active");
    assert_column_exists(&conn, "tasks", "is_done");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayplan.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO projects (uuid, owner, title, created_at)
             VALUES ('00000000-0000-4000-8000-000000000001', 'alice', 'thesis', 0);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), SCHEMA_VERSION);
    let projects: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(projects, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        StoreError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_missing_a_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP TABLE tasks;").unwrap();
    drop(conn);

    assert!(matches!(
        open_db(&path),
        Err(StoreError::MissingTable("tasks"))
    ));
}

#[test]
fn deleting_a_project_cascades_to_its_tasks() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO projects (uuid, owner, title, created_at)
         VALUES ('00000000-0000-4000-8000-000000000001', 'alice', 'thesis', 0);
         INSERT INTO tasks (uuid, project_uuid, title, created_at)
         VALUES ('00000000-0000-4000-8000-000000000002',
                 '00000000-0000-4000-8000-000000000001', 'outline', 0);
         DELETE FROM projects;",
    )
    .unwrap();

    let tasks: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tasks, 0);
}

#[test]
fn schema_rejects_unknown_enumerations() {
    let conn = open_db_in_memory().unwrap();

    let repeat = conn.execute(
        "INSERT INTO recurring_items (uuid, owner, kind, title, anchor_start, repeat)
         VALUES ('00000000-0000-4000-8000-000000000001', 'alice', 'event', 't', 0, 'yearly');",
        [],
    );
    assert!(repeat.is_err());

    conn.execute(
        "INSERT INTO projects (uuid, owner, title, created_at)
         VALUES ('00000000-0000-4000-8000-000000000002', 'alice', 'thesis', 0);",
        [],
    )
    .unwrap();
    let priority = conn.execute(
        "INSERT INTO tasks (uuid, project_uuid, title, priority, created_at)
         VALUES ('00000000-0000-4000-8000-000000000003',
                 '00000000-0000-4000-8000-000000000002', 'outline', 'urgent', 0);",
        [],
    );
    assert!(priority.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_column_exists(conn: &Connection, table_name: &str, column_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM pragma_table_info(?1)
                WHERE name = ?2
            );",
            [table_name, column_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "column {table_name}.{column_name} does not exist");
}
