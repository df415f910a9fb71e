//! Employee note repository contracts and SQLite implementation.
//!
//! # Invariants
//! - At most one note per employee (`employee_notes.employee_id` UNIQUE).
//! - Upsert is keyed by employee id; last write wins, no history is kept.

use super::sqlite::{parse_uuid, SqliteReviewRepository, NOW_MS_SQL};
use super::{RepoError, RepoResult};
use crate::model::employee::EmployeeId;
use crate::model::evaluation::EmployeeNote;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

/// Repository interface for employee notes.
pub trait NoteRepository {
    /// Gets the note of one employee, if written.
    fn get_note(&self, employee_id: EmployeeId) -> RepoResult<Option<EmployeeNote>>;
    /// Inserts or replaces the note of one employee.
    fn upsert_note(&self, employee_id: EmployeeId, content: &str) -> RepoResult<EmployeeNote>;
}

impl NoteRepository for SqliteReviewRepository<'_> {
    fn get_note(&self, employee_id: EmployeeId) -> RepoResult<Option<EmployeeNote>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, employee_id, content, updated_at
                 FROM employee_notes
                 WHERE employee_id = ?1;",
                [employee_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("id")?,
                        row.get::<_, String>("employee_id")?,
                        row.get::<_, String>("content")?,
                        row.get::<_, i64>("updated_at")?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id_text, employee_text, content, updated_at)) => Ok(Some(EmployeeNote {
                id: parse_uuid(&id_text, "employee_notes.id")?,
                employee_id: parse_uuid(&employee_text, "employee_notes.employee_id")?,
                content,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    fn upsert_note(&self, employee_id: EmployeeId, content: &str) -> RepoResult<EmployeeNote> {
        self.conn.execute(
            &format!(
                "INSERT INTO employee_notes (id, employee_id, content)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (employee_id) DO UPDATE SET
                    content = excluded.content,
                    updated_at = {NOW_MS_SQL};"
            ),
            params![Uuid::new_v4().to_string(), employee_id.to_string(), content],
        )?;
        self.get_note(employee_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("upserted note for employee {employee_id} not readable"))
        })
    }
}
