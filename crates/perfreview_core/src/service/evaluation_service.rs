//! Evaluation use-case service: competency ratings, notes and goals of one
//! employee.
//!
//! # Invariants
//! - Employees without a profile get no competency fetch at all.
//! - Ratings outside `1..=10` are rejected before any store call.
//! - A goal's description is required; its competency links are reconciled
//!   after the goal row is written.

use super::{ServiceError, ServiceResult};
use crate::model::employee::{EmployeeId, EmployeeRecord};
use crate::model::evaluation::{
    CompetencyRating, EmployeeNote, GoalDraft, GoalId, GoalRecord, RatingValue,
};
use crate::model::profile::{Competency, CompetencyId};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::profile_repo::{CompetencyOrder, CompetencyQuery, ProfileRepository};
use crate::repo::rating_repo::RatingRepository;
use crate::repo::RepoResult;
use crate::sync::{relink_goal_competencies, upsert_note, upsert_rating};
use log::info;
use std::collections::HashMap;

/// Label for a competency without a rating.
pub const NOT_RATED_LABEL: &str = "Not rated";

/// One competency with the employee's current rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedCompetency {
    pub competency: Competency,
    pub rating: Option<RatingValue>,
}

impl RatedCompetency {
    /// `"N/10"`, or [`NOT_RATED_LABEL`].
    pub fn rating_label(&self) -> String {
        self.rating
            .map_or_else(|| NOT_RATED_LABEL.to_string(), |rating| rating.to_string())
    }

    pub fn has_description(&self) -> bool {
        !self.competency.description.trim().is_empty()
    }
}

/// Competency evaluation state of one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompetencySheet {
    /// Employee has no profile; nothing can be rated.
    NoProfileAssigned,
    /// Assigned profile defines no competencies.
    NoCompetencies,
    /// Competencies in definition order with current ratings.
    Ready(Vec<RatedCompetency>),
}

/// Required repository capabilities for evaluation use-cases.
pub trait EvaluationRepository:
    ProfileRepository + RatingRepository + NoteRepository + GoalRepository
{
}

impl<T> EvaluationRepository for T where
    T: ProfileRepository + RatingRepository + NoteRepository + GoalRepository
{
}

/// Evaluation service facade over repository implementations.
pub struct EvaluationService<R: EvaluationRepository> {
    repo: R,
}

impl<R: EvaluationRepository> EvaluationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads the competency sheet of an employee.
    pub fn competency_sheet(&self, employee: &EmployeeRecord) -> RepoResult<CompetencySheet> {
        let Some(profile_id) = employee.employee.profile_id else {
            return Ok(CompetencySheet::NoProfileAssigned);
        };

        let competencies = self.repo.list_competencies(&CompetencyQuery::for_profile(
            profile_id,
            CompetencyOrder::CreatedAsc,
        ))?;
        if competencies.is_empty() {
            return Ok(CompetencySheet::NoCompetencies);
        }

        let ratings: HashMap<CompetencyId, RatingValue> = self
            .repo
            .list_ratings(employee.id())?
            .into_iter()
            .map(|rating| (rating.competency_id, rating.rating))
            .collect();

        Ok(CompetencySheet::Ready(
            competencies
                .into_iter()
                .map(|competency| RatedCompetency {
                    rating: ratings.get(&competency.id).copied(),
                    competency,
                })
                .collect(),
        ))
    }

    /// Rates one competency; accepts exactly the integers 1 through 10.
    pub fn rate_competency(
        &self,
        employee_id: EmployeeId,
        competency_id: CompetencyId,
        rating: i64,
    ) -> ServiceResult<CompetencyRating> {
        let rating = RatingValue::new(rating)?;
        Ok(upsert_rating(&self.repo, employee_id, competency_id, rating)?)
    }

    /// Current note of an employee, if written.
    pub fn note(&self, employee_id: EmployeeId) -> RepoResult<Option<EmployeeNote>> {
        self.repo.get_note(employee_id)
    }

    /// Saves the note of an employee; content may be empty.
    pub fn save_note(&self, employee_id: EmployeeId, content: &str) -> ServiceResult<EmployeeNote> {
        Ok(upsert_note(&self.repo, employee_id, content)?)
    }

    /// Goals of an employee newest first, with linked competencies.
    pub fn goals(&self, employee_id: EmployeeId) -> RepoResult<Vec<GoalRecord>> {
        self.repo.list_goals(employee_id)
    }

    /// Competencies a goal of this employee may link to, alphabetical.
    pub fn linkable_competencies(&self, employee: &EmployeeRecord) -> RepoResult<Vec<Competency>> {
        match employee.employee.profile_id {
            Some(profile_id) => self.repo.list_competencies(&CompetencyQuery::for_profile(
                profile_id,
                CompetencyOrder::NameAsc,
            )),
            None => Ok(Vec::new()),
        }
    }

    pub fn create_goal(
        &self,
        employee_id: EmployeeId,
        draft: &GoalDraft,
    ) -> ServiceResult<GoalRecord> {
        let valid = draft.validate()?;
        let goal = self
            .repo
            .insert_goal(employee_id, valid.description.as_str())?;
        relink_goal_competencies(&self.repo, goal.id, &valid.competency_ids)?;
        info!(
            "event=goal_create module=service status=ok goal_id={} employee_id={}",
            goal.id, employee_id
        );
        self.get_goal(goal.id)
    }

    pub fn update_goal(&self, goal_id: GoalId, draft: &GoalDraft) -> ServiceResult<GoalRecord> {
        let valid = draft.validate()?;
        self.repo.update_goal(goal_id, valid.description.as_str())?;
        relink_goal_competencies(&self.repo, goal_id, &valid.competency_ids)?;
        self.get_goal(goal_id)
    }

    pub fn delete_goal(&self, goal_id: GoalId) -> ServiceResult<()> {
        self.repo.delete_goal(goal_id)?;
        info!("event=goal_delete module=service status=ok goal_id={goal_id}");
        Ok(())
    }

    fn get_goal(&self, goal_id: GoalId) -> ServiceResult<GoalRecord> {
        self.repo.get_goal(goal_id)?.ok_or(ServiceError::NotFound {
            entity: "goal",
            id: goal_id,
        })
    }
}
