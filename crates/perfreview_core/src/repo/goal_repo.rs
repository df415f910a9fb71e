//! Goal and goal-competency link repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist goals and their many-to-many competency links.
//! - Reconcile a goal's link set against a desired set atomically.
//!
//! # Invariants
//! - At most one link row per (goal, competency) pair.
//! - Link reconciliation touches only rows that change; unchanged links keep
//!   their identity.

use super::sqlite::{
    parse_competency_row, parse_uuid, row_exists, SqliteReviewRepository, NOW_MS_SQL,
};
use super::{RepoError, RepoResult};
use crate::model::employee::EmployeeId;
use crate::model::evaluation::{Goal, GoalId, GoalRecord};
use crate::model::profile::{Competency, CompetencyId};
use crate::sync::plan::{plan_link_changes, LinkPlan};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    description,
    created_at,
    updated_at
FROM goals";

/// Repository interface for goals.
pub trait GoalRepository {
    /// Lists goals of one employee newest first, joined with competencies.
    fn list_goals(&self, employee_id: EmployeeId) -> RepoResult<Vec<GoalRecord>>;
    /// Gets one goal joined with its competencies.
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<GoalRecord>>;
    /// Inserts one goal without links.
    fn insert_goal(&self, employee_id: EmployeeId, description: &str) -> RepoResult<Goal>;
    /// Replaces the description of one goal.
    fn update_goal(&self, id: GoalId, description: &str) -> RepoResult<()>;
    /// Deletes one goal and its links.
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
    /// Reconciles the link set of one goal to `desired` in one transaction.
    fn replace_goal_competencies(
        &self,
        goal_id: GoalId,
        desired: &BTreeSet<CompetencyId>,
    ) -> RepoResult<LinkPlan>;
}

impl GoalRepository for SqliteReviewRepository<'_> {
    fn list_goals(&self, employee_id: EmployeeId) -> RepoResult<Vec<GoalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE employee_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([employee_id.to_string()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            let goal = parse_goal_row(row)?;
            let competencies = load_competencies_for_goal(self.conn, goal.id)?;
            goals.push(GoalRecord { goal, competencies });
        }
        Ok(goals)
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<GoalRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let goal = parse_goal_row(row)?;
            let competencies = load_competencies_for_goal(self.conn, goal.id)?;
            return Ok(Some(GoalRecord { goal, competencies }));
        }
        Ok(None)
    }

    fn insert_goal(&self, employee_id: EmployeeId, description: &str) -> RepoResult<Goal> {
        if !row_exists(self.conn, "employees", employee_id)? {
            return Err(RepoError::NotFound {
                entity: "employee",
                id: employee_id,
            });
        }
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO goals (id, employee_id, description) VALUES (?1, ?2, ?3);",
            params![id.to_string(), employee_id.to_string(), description],
        )?;
        self.get_goal(id)?
            .map(|record| record.goal)
            .ok_or_else(|| RepoError::InvalidData(format!("inserted goal {id} not readable")))
    }

    fn update_goal(&self, id: GoalId, description: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE goals
                 SET
                    description = ?2,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), description],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "goal", id });
        }
        Ok(())
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "goal", id });
        }
        Ok(())
    }

    fn replace_goal_competencies(
        &self,
        goal_id: GoalId,
        desired: &BTreeSet<CompetencyId>,
    ) -> RepoResult<LinkPlan> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "goals", goal_id)? {
            return Err(RepoError::NotFound {
                entity: "goal",
                id: goal_id,
            });
        }

        let current = linked_competency_ids(&tx, goal_id)?;
        let plan = plan_link_changes(&current, desired);

        for competency_id in &plan.remove {
            tx.execute(
                "DELETE FROM goal_competencies WHERE goal_id = ?1 AND competency_id = ?2;",
                params![goal_id.to_string(), competency_id.to_string()],
            )?;
        }
        for competency_id in &plan.add {
            tx.execute(
                "INSERT INTO goal_competencies (id, goal_id, competency_id) VALUES (?1, ?2, ?3);",
                params![
                    Uuid::new_v4().to_string(),
                    goal_id.to_string(),
                    competency_id.to_string(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(plan)
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let employee_text: String = row.get("employee_id")?;
    Ok(Goal {
        id: parse_uuid(&id_text, "goals.id")?,
        employee_id: parse_uuid(&employee_text, "goals.employee_id")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_competencies_for_goal(conn: &Connection, goal_id: GoalId) -> RepoResult<Vec<Competency>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.id AS id,
            c.profile_id AS profile_id,
            c.name AS name,
            c.description AS description,
            c.created_at AS created_at,
            c.updated_at AS updated_at
         FROM goal_competencies gc
         INNER JOIN competencies c ON c.id = gc.competency_id
         WHERE gc.goal_id = ?1
         ORDER BY c.name COLLATE NOCASE ASC, c.rowid ASC;",
    )?;
    let mut rows = stmt.query([goal_id.to_string()])?;
    let mut competencies = Vec::new();
    while let Some(row) = rows.next()? {
        competencies.push(parse_competency_row(row)?);
    }
    Ok(competencies)
}

fn linked_competency_ids(conn: &Connection, goal_id: GoalId) -> RepoResult<BTreeSet<CompetencyId>> {
    let mut stmt = conn.prepare("SELECT competency_id FROM goal_competencies WHERE goal_id = ?1;")?;
    let mut rows = stmt.query([goal_id.to_string()])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.insert(parse_uuid(&text, "goal_competencies.competency_id")?);
    }
    Ok(ids)
}
