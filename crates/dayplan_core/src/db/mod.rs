//! SQLite store bootstrap for dayplan items, projects and tasks.
//!
//! # Responsibility
//! - Open configured connections with the current schema in place.
//! - Report stores written by a newer binary or missing a dayplan table.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A returned connection holds every table in [`REQUIRED_TABLES`].

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{schema_version, REQUIRED_TABLES, SCHEMA_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to open or bootstrap the dayplan store.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer dayplan build.
    SchemaTooNew { found: u32, supported: u32 },
    /// The version pragma claims the current schema but a table is absent.
    MissingTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store schema version {found} is newer than this build supports ({supported})"
            ),
            Self::MissingTable(table) => write!(f, "store is missing table `{table}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
