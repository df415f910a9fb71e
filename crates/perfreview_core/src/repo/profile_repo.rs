//! Profile/competency repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist profiles and the competencies they own.
//! - Own the transactional profile edit (header row plus competency list).
//!
//! # Invariants
//! - Deleting a profile cascades to its competencies (store FK).
//! - `competencies.profile_id` is never updated.
//! - Competency order is creation order (`created_at ASC, rowid ASC`).

use super::sqlite::{
    parse_competency_row, parse_profile_row, parse_uuid, row_exists, SqliteReviewRepository,
    NOW_MS_SQL,
};
use super::{RepoError, RepoResult};
use crate::model::profile::{Competency, CompetencyDraft, Profile, ProfileId};
use crate::sync::plan::{plan_competency_changes, CompetencyPlan};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROFILE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_at,
    updated_at
FROM profiles";

const COMPETENCY_SELECT_SQL: &str = "SELECT
    id,
    profile_id,
    name,
    description,
    created_at,
    updated_at
FROM competencies";

/// Sort order for profile lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileOrder {
    /// Newest first (profile management list).
    #[default]
    CreatedDesc,
    /// Alphabetical (assignment picker).
    NameAsc,
}

/// Sort order for competency lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompetencyOrder {
    /// Definition order inside the profile.
    #[default]
    CreatedAsc,
    /// Alphabetical (goal linking picker).
    NameAsc,
}

/// Query options for listing competencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompetencyQuery {
    /// Equality filter on owning profile; `None` lists every competency.
    pub profile_id: Option<ProfileId>,
    pub order: CompetencyOrder,
}

impl CompetencyQuery {
    pub fn for_profile(profile_id: ProfileId, order: CompetencyOrder) -> Self {
        Self {
            profile_id: Some(profile_id),
            order,
        }
    }
}

/// Repository interface for profiles and competencies.
pub trait ProfileRepository {
    /// Lists all profiles.
    fn list_profiles(&self, order: ProfileOrder) -> RepoResult<Vec<Profile>>;
    /// Gets one profile by id.
    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<Profile>>;
    /// Inserts one profile and returns the stored row.
    fn insert_profile(&self, name: &str, description: &str) -> RepoResult<Profile>;
    /// Deletes one profile and, by cascade, its competencies.
    fn delete_profile(&self, id: ProfileId) -> RepoResult<()>;
    /// Lists competencies using filter and ordering options.
    fn list_competencies(&self, query: &CompetencyQuery) -> RepoResult<Vec<Competency>>;
    /// Bulk-inserts competencies for one profile in one transaction.
    fn insert_competencies(
        &self,
        profile_id: ProfileId,
        drafts: &[CompetencyDraft],
    ) -> RepoResult<Vec<Competency>>;
    /// Rewrites name/description of one profile and reconciles its full
    /// competency list, all in one transaction.
    fn update_profile(
        &self,
        id: ProfileId,
        name: &str,
        description: &str,
        competencies: &[CompetencyDraft],
    ) -> RepoResult<CompetencyPlan>;
}

impl ProfileRepository for SqliteReviewRepository<'_> {
    fn list_profiles(&self, order: ProfileOrder) -> RepoResult<Vec<Profile>> {
        let order_sql = match order {
            ProfileOrder::CreatedDesc => "created_at DESC, rowid DESC",
            ProfileOrder::NameAsc => "name COLLATE NOCASE ASC, rowid ASC",
        };
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFILE_SELECT_SQL} ORDER BY {order_sql};"))?;
        let mut rows = stmt.query([])?;
        let mut profiles = Vec::new();
        while let Some(row) = rows.next()? {
            profiles.push(parse_profile_row(row)?);
        }
        Ok(profiles)
    }

    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<Profile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROFILE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }
        Ok(None)
    }

    fn insert_profile(&self, name: &str, description: &str) -> RepoResult<Profile> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO profiles (id, name, description) VALUES (?1, ?2, ?3);",
            params![id.to_string(), name, description],
        )?;
        self.get_profile(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("inserted profile {id} not readable")))
    }

    fn delete_profile(&self, id: ProfileId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM profiles WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "profile",
                id,
            });
        }
        Ok(())
    }

    fn list_competencies(&self, query: &CompetencyQuery) -> RepoResult<Vec<Competency>> {
        let mut sql = format!("{COMPETENCY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(profile_id) = query.profile_id {
            sql.push_str(" AND profile_id = ?");
            bind_values.push(Value::Text(profile_id.to_string()));
        }

        sql.push_str(match query.order {
            CompetencyOrder::CreatedAsc => " ORDER BY created_at ASC, rowid ASC;",
            CompetencyOrder::NameAsc => " ORDER BY name COLLATE NOCASE ASC, rowid ASC;",
        });

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut competencies = Vec::new();
        while let Some(row) = rows.next()? {
            competencies.push(parse_competency_row(row)?);
        }
        Ok(competencies)
    }

    fn insert_competencies(
        &self,
        profile_id: ProfileId,
        drafts: &[CompetencyDraft],
    ) -> RepoResult<Vec<Competency>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_profile_exists(&tx, profile_id)?;
        for draft in drafts {
            insert_competency(&tx, profile_id, draft)?;
        }
        tx.commit()?;

        self.list_competencies(&CompetencyQuery::for_profile(
            profile_id,
            CompetencyOrder::CreatedAsc,
        ))
    }

    fn update_profile(
        &self,
        id: ProfileId,
        name: &str,
        description: &str,
        competencies: &[CompetencyDraft],
    ) -> RepoResult<CompetencyPlan> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            &format!(
                "UPDATE profiles
                 SET
                    name = ?2,
                    description = ?3,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), name, description],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "profile",
                id,
            });
        }

        let plan = reconcile_competencies(&tx, id, competencies)?;
        tx.commit()?;
        Ok(plan)
    }
}

/// Applies the id-matched competency plan for one profile on `conn`.
fn reconcile_competencies(
    conn: &Connection,
    profile_id: ProfileId,
    drafts: &[CompetencyDraft],
) -> RepoResult<CompetencyPlan> {
    let existing = owned_competency_ids(conn, profile_id)?;
    let plan = plan_competency_changes(&existing, drafts);

    for id in &plan.delete {
        conn.execute("DELETE FROM competencies WHERE id = ?1;", [id.to_string()])?;
    }
    for (id, draft) in &plan.update {
        conn.execute(
            &format!(
                "UPDATE competencies
                 SET
                    name = ?2,
                    description = ?3,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1
                   AND profile_id = ?4;"
            ),
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.description.as_str(),
                profile_id.to_string(),
            ],
        )?;
    }
    for draft in &plan.insert {
        insert_competency(conn, profile_id, draft)?;
    }
    Ok(plan)
}

fn insert_competency(
    conn: &Connection,
    profile_id: ProfileId,
    draft: &CompetencyDraft,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO competencies (id, profile_id, name, description)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            Uuid::new_v4().to_string(),
            profile_id.to_string(),
            draft.name.as_str(),
            draft.description.as_str(),
        ],
    )?;
    Ok(())
}

fn ensure_profile_exists(conn: &Connection, profile_id: ProfileId) -> RepoResult<()> {
    if !row_exists(conn, "profiles", profile_id)? {
        return Err(RepoError::NotFound {
            entity: "profile",
            id: profile_id,
        });
    }
    Ok(())
}

fn owned_competency_ids(conn: &Connection, profile_id: ProfileId) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT id
         FROM competencies
         WHERE profile_id = ?1
         ORDER BY created_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query([profile_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.push(parse_uuid(&text, "competencies.id")?);
    }
    Ok(ids)
}
