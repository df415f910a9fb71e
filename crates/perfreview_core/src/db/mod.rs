//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing the review store.
//! - Apply schema migrations in deterministic order and check schema
//!   readiness for repositories.
//! - Bind a store file to one deployment key.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write review data before migrations succeed.
//! - Cascading deletes are enforced by the store (`foreign_keys=ON`).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_store, MEMORY_STORE_URL};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Migration ran but did not create a table it declares.
    MigrationIncomplete { version: u32, table: &'static str },
    /// Store file was initialized for a different deployment key.
    StoreKeyMismatch,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MigrationIncomplete { version, table } => {
                write!(f, "migration {version} did not create table `{table}`")
            }
            Self::StoreKeyMismatch => {
                write!(f, "store was initialized with a different store key")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::MigrationIncomplete { .. } => None,
            Self::StoreKeyMismatch => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
