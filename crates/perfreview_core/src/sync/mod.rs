//! Association reconciliation protocols.
//!
//! # Responsibility
//! - Rating upsert: update the row of an exact (employee, competency) pair or
//!   insert one.
//! - Goal link replace: reconcile a goal's competency set.
//! - Profile competency replace: rewrite a profile's competency list.
//! - Note upsert: last-write-wins note per employee.
//!
//! # Invariants
//! - A failed protocol commits nothing; multi-row steps share one transaction.
//! - Every failure is logged and surfaced as `SyncError::Store`.

pub mod plan;

use crate::model::employee::EmployeeId;
use crate::model::evaluation::{CompetencyRating, EmployeeNote, GoalId, RatingValue};
use crate::model::profile::{Competency, CompetencyDraft, CompetencyId, ProfileId};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::profile_repo::{CompetencyOrder, CompetencyQuery, ProfileRepository};
use crate::repo::rating_repo::RatingRepository;
use crate::repo::RepoError;
use log::{error, info};
use plan::LinkPlan;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one reconciliation protocol.
#[derive(Debug)]
pub enum SyncError {
    /// Store call failed; the operation as a whole failed.
    Store(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "operation failed: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Whether a profile's competency list is being created or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceMode<'a> {
    /// New profile: nothing to delete, insert only.
    Create,
    /// Existing profile: rewrite its header and reconcile against stored
    /// rows in the same transaction.
    Edit { name: &'a str, description: &'a str },
}

impl ReplaceMode<'_> {
    fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit { .. } => "edit",
        }
    }
}

/// Sets the rating for one (employee, competency) pair.
///
/// Looks the pair up first and updates in place when found, inserts
/// otherwise; does not rely on a store-level upsert for composite keys.
pub fn upsert_rating<R>(
    repo: &R,
    employee_id: EmployeeId,
    competency_id: CompetencyId,
    rating: RatingValue,
) -> SyncResult<CompetencyRating>
where
    R: RatingRepository + ?Sized,
{
    let result = (|| -> SyncResult<(CompetencyRating, bool)> {
        let existed = match repo.find_rating(employee_id, competency_id)? {
            Some(_) => {
                repo.update_rating(employee_id, competency_id, rating)?;
                true
            }
            None => {
                repo.insert_rating(employee_id, competency_id, rating)?;
                false
            }
        };
        let stored = repo
            .find_rating(employee_id, competency_id)?
            .ok_or(SyncError::InconsistentState("rating missing after upsert"))?;
        Ok((stored, existed))
    })();

    match result {
        Ok((stored, existed)) => {
            info!(
                "event=rating_upsert module=sync status=ok employee_id={} competency_id={} rating={} path={}",
                employee_id,
                competency_id,
                stored.rating.get(),
                if existed { "update" } else { "insert" }
            );
            Ok(stored)
        }
        Err(err) => Err(log_failure("rating_upsert", err)),
    }
}

/// Reconciles a goal's competency links with `desired`.
///
/// Unchanged links are kept, removed links deleted, new links inserted, all in
/// one transaction. An empty `desired` clears the set and inserts nothing.
pub fn relink_goal_competencies<R>(
    repo: &R,
    goal_id: GoalId,
    desired: &BTreeSet<CompetencyId>,
) -> SyncResult<LinkPlan>
where
    R: GoalRepository + ?Sized,
{
    match repo.replace_goal_competencies(goal_id, desired) {
        Ok(plan) => {
            info!(
                "event=goal_relink module=sync status=ok goal_id={} added={} removed={} kept={}",
                goal_id,
                plan.add.len(),
                plan.remove.len(),
                plan.keep.len()
            );
            Ok(plan)
        }
        Err(err) => Err(log_failure("goal_relink", err.into())),
    }
}

/// Writes a profile's competency list and returns it as stored.
///
/// Drafts with empty names are dropped. `Create` only inserts; `Edit`
/// updates the profile row and reconciles the stored list against the
/// drafts, committing both or neither.
pub fn replace_profile_competencies<R>(
    repo: &R,
    profile_id: ProfileId,
    drafts: &[CompetencyDraft],
    mode: ReplaceMode<'_>,
) -> SyncResult<Vec<Competency>>
where
    R: ProfileRepository + ?Sized,
{
    let drafts: Vec<CompetencyDraft> = drafts
        .iter()
        .filter(|draft| !draft.is_blank())
        .cloned()
        .collect();

    let result = (|| -> Result<Vec<Competency>, RepoError> {
        match mode {
            ReplaceMode::Create => {
                if drafts.is_empty() {
                    return Ok(Vec::new());
                }
                repo.insert_competencies(profile_id, &drafts)
            }
            ReplaceMode::Edit { name, description } => {
                repo.update_profile(profile_id, name, description, &drafts)?;
                repo.list_competencies(&CompetencyQuery::for_profile(
                    profile_id,
                    CompetencyOrder::CreatedAsc,
                ))
            }
        }
    })();

    match result {
        Ok(stored) => {
            info!(
                "event=profile_competencies_replace module=sync status=ok profile_id={} mode={} count={}",
                profile_id,
                mode.label(),
                stored.len()
            );
            Ok(stored)
        }
        Err(err) => Err(log_failure("profile_competencies_replace", err.into())),
    }
}

/// Writes the note of one employee; last write wins.
pub fn upsert_note<R>(repo: &R, employee_id: EmployeeId, content: &str) -> SyncResult<EmployeeNote>
where
    R: NoteRepository + ?Sized,
{
    match repo.upsert_note(employee_id, content) {
        Ok(note) => {
            info!(
                "event=note_upsert module=sync status=ok employee_id={} content_chars={}",
                employee_id,
                note.content.chars().count()
            );
            Ok(note)
        }
        Err(err) => Err(log_failure("note_upsert", err.into())),
    }
}

fn log_failure(event: &'static str, err: SyncError) -> SyncError {
    error!(
        "event={} module=sync status=error error_code=operation_failed error={}",
        event, err
    );
    err
}
