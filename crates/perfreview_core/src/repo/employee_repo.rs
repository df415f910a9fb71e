//! Employee repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Reads join the assigned profile (`LEFT JOIN`, nullable).
//! - Deleting an employee cascades to note, ratings, goals and goal links.
//! - Assigning a profile that does not exist is rejected as `NotFound`.

use super::sqlite::{
    parse_optional_uuid, parse_uuid, row_exists, SqliteReviewRepository, NOW_MS_SQL,
};
use super::{RepoError, RepoResult};
use crate::model::employee::{Employee, EmployeeDraft, EmployeeId, EmployeeRecord};
use crate::model::profile::{Profile, ProfileId};
use rusqlite::{params, Row};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    e.id AS id,
    e.name AS name,
    e.title AS title,
    e.profile_id AS profile_id,
    e.created_at AS created_at,
    e.updated_at AS updated_at,
    p.id AS profile_row_id,
    p.name AS profile_name,
    p.description AS profile_description,
    p.created_at AS profile_created_at,
    p.updated_at AS profile_updated_at
FROM employees e
LEFT JOIN profiles p ON p.id = e.profile_id";

/// Repository interface for employees.
pub trait EmployeeRepository {
    /// Lists employees newest first, joined with their profile.
    fn list_employees(&self) -> RepoResult<Vec<EmployeeRecord>>;
    /// Gets one employee joined with its profile.
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<EmployeeRecord>>;
    /// Inserts one employee from a validated draft.
    fn insert_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee>;
    /// Replaces name/title/profile of one employee.
    fn update_employee(&self, id: EmployeeId, draft: &EmployeeDraft) -> RepoResult<()>;
    /// Deletes one employee and everything it owns.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
}

impl SqliteReviewRepository<'_> {
    fn ensure_profile_assignable(&self, profile_id: Option<ProfileId>) -> RepoResult<()> {
        if let Some(profile_id) = profile_id {
            if !row_exists(self.conn, "profiles", profile_id)? {
                return Err(RepoError::NotFound {
                    entity: "profile",
                    id: profile_id,
                });
            }
        }
        Ok(())
    }
}

impl EmployeeRepository for SqliteReviewRepository<'_> {
    fn list_employees(&self) -> RepoResult<Vec<EmployeeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} ORDER BY e.created_at DESC, e.rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<EmployeeRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE e.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn insert_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee> {
        self.ensure_profile_assignable(draft.profile_id)?;
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO employees (id, name, title, profile_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.title.as_str(),
                draft.profile_id.map(|value| value.to_string()),
            ],
        )?;
        self.get_employee(id)?
            .map(|record| record.employee)
            .ok_or_else(|| RepoError::InvalidData(format!("inserted employee {id} not readable")))
    }

    fn update_employee(&self, id: EmployeeId, draft: &EmployeeDraft) -> RepoResult<()> {
        self.ensure_profile_assignable(draft.profile_id)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE employees
                 SET
                    name = ?2,
                    title = ?3,
                    profile_id = ?4,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.title.as_str(),
                draft.profile_id.map(|value| value.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "employee",
                id,
            });
        }
        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "employee",
                id,
            });
        }
        Ok(())
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<EmployeeRecord> {
    let id_text: String = row.get("id")?;
    let employee = Employee {
        id: parse_uuid(&id_text, "employees.id")?,
        name: row.get("name")?,
        title: row.get("title")?,
        profile_id: parse_optional_uuid(row.get("profile_id")?, "employees.profile_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    let profile = match parse_optional_uuid(row.get("profile_row_id")?, "profiles.id")? {
        Some(profile_id) => Some(Profile {
            id: profile_id,
            name: row.get("profile_name")?,
            description: row.get("profile_description")?,
            created_at: row.get("profile_created_at")?,
            updated_at: row.get("profile_updated_at")?,
        }),
        None => None,
    };

    Ok(EmployeeRecord { employee, profile })
}
