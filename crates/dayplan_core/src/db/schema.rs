//! Dayplan store schema: creation, version gate and table check.
//!
//! # Invariants
//! - A fresh store (version 0) gets the whole schema in one transaction.
//! - Versions above [`SCHEMA_VERSION`] are never touched.

use crate::db::{StoreError, StoreResult};
use rusqlite::Connection;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Tables every dayplan store must hold.
pub const REQUIRED_TABLES: [&str; 3] = ["recurring_items", "projects", "tasks"];

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Creates the schema on a fresh store and checks the dayplan tables.
pub(crate) fn ensure_schema(conn: &mut Connection) -> StoreResult<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    if found == 0 {
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA_SQL)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
    }

    for table in REQUIRED_TABLES {
        let present: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if !present {
            return Err(StoreError::MissingTable(table));
        }
    }
    Ok(())
}
