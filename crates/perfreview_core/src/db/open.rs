//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Store URL value selecting a private in-memory database.
pub const MEMORY_STORE_URL: &str = ":memory:";

const STORE_KEY_META: &str = "store_key";

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

/// Opens the store described by deployment configuration.
///
/// The first open of a store records `store_key`; later opens must present
/// the same key or fail with [`DbError::StoreKeyMismatch`].
pub fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    let conn = if config.url == MEMORY_STORE_URL {
        open_db_in_memory()?
    } else {
        open_db(config.url.as_str())?
    };

    match bind_store_key(&conn, config.key.as_str()) {
        Ok(()) => Ok(conn),
        Err(err) => {
            error!(
                "event=store_bind module=db status=error error_code=store_key_rejected error={}",
                err
            );
            Err(err)
        }
    }
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

fn bind_store_key(conn: &Connection, key: &str) -> DbResult<()> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = ?1;",
            [STORE_KEY_META],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(value) if value == key => Ok(()),
        Some(_) => Err(DbError::StoreKeyMismatch),
        None => {
            conn.execute(
                "INSERT INTO store_meta (key, value) VALUES (?1, ?2);",
                [STORE_KEY_META, key],
            )?;
            info!("event=store_bind module=db status=ok first_open=true");
            Ok(())
        }
    }
}
