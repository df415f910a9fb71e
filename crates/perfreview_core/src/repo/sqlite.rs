//! SQLite-backed review repository.
//!
//! One connection-borrowing struct implements every repository trait; the
//! trait impls live next to their trait definitions.

use super::{RepoError, RepoResult};
use crate::db::migrations::{latest_version, schema_state, SchemaState};
use crate::model::profile::{Competency, Profile};
use rusqlite::{Connection, Row};
use uuid::Uuid;

pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

/// SQLite implementation of all review repository traits.
#[derive(Debug, Clone, Copy)]
pub struct SqliteReviewRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_review_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn parse_profile_row(row: &Row<'_>) -> RepoResult<Profile> {
    let id_text: String = row.get("id")?;
    Ok(Profile {
        id: parse_uuid(&id_text, "profiles.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn parse_competency_row(row: &Row<'_>) -> RepoResult<Competency> {
    let id_text: String = row.get("id")?;
    let profile_text: String = row.get("profile_id")?;
    Ok(Competency {
        id: parse_uuid(&id_text, "competencies.id")?,
        profile_id: parse_uuid(&profile_text, "competencies.profile_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_review_connection_ready(conn: &Connection) -> RepoResult<()> {
    match schema_state(conn)? {
        SchemaState::Ready => Ok(()),
        SchemaState::VersionMismatch { actual_version } => Err(RepoError::UninitializedConnection {
            expected_version: latest_version(),
            actual_version,
        }),
        SchemaState::MissingTable(table) => Err(RepoError::MissingRequiredTable(table)),
    }
}
