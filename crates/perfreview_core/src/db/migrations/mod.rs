//! Review store schema: versioned migrations and readiness checks.
//!
//! # Responsibility
//! - Register schema migrations, each with the tables it introduces.
//! - Apply pending migrations atomically and verify their tables before
//!   committing.
//! - Report whether a connection carries the full review schema.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A store at the latest version holds every table of every migration.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
    tables: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_profiles_employees.sql"),
        tables: &["profiles", "competencies", "employees"],
    },
    Migration {
        version: 2,
        sql: include_str!("0002_evaluations.sql"),
        tables: &[
            "competency_ratings",
            "employee_notes",
            "goals",
            "goal_competencies",
        ],
    },
    Migration {
        version: 3,
        sql: include_str!("0003_store_meta.sql"),
        tables: &["store_meta"],
    },
];

/// Readiness of a connection for review reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Latest version with every registered table present.
    Ready,
    /// `user_version` differs from [`latest_version`].
    VersionMismatch { actual_version: u32 },
    /// Version matches but a registered table is gone.
    MissingTable(&'static str),
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Tables a fully migrated store holds, in migration order.
pub fn required_tables() -> impl Iterator<Item = &'static str> {
    MIGRATIONS
        .iter()
        .flat_map(|migration| migration.tables.iter().copied())
}

/// Applies all pending migrations on the provided connection.
///
/// Each migration must leave its declared tables behind; otherwise the
/// whole batch rolls back with [`DbError::MigrationIncomplete`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version)
    {
        tx.execute_batch(migration.sql)?;
        if let Some(table) = first_missing_table(&tx, migration.tables)? {
            return Err(DbError::MigrationIncomplete {
                version: migration.version,
                table,
            });
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

/// Checks version and tables without modifying the connection.
pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let actual_version = current_user_version(conn)?;
    if actual_version != latest_version() {
        return Ok(SchemaState::VersionMismatch { actual_version });
    }
    for migration in MIGRATIONS {
        if let Some(table) = first_missing_table(conn, migration.tables)? {
            return Ok(SchemaState::MissingTable(table));
        }
    }
    Ok(SchemaState::Ready)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn first_missing_table(
    conn: &Connection,
    tables: &'static [&'static str],
) -> DbResult<Option<&'static str>> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Ok(Some(table));
        }
    }
    Ok(None)
}
