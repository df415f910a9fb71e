//! Per-employee evaluation records: ratings, notes and goals.
//!
//! # Invariants
//! - A rating value is always an integer in `1..=10`.
//! - A goal's competency set is unordered and duplicate-free.

use super::employee::EmployeeId;
use super::profile::{Competency, CompetencyId};
use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RatingId = Uuid;
pub type NoteId = Uuid;
pub type GoalId = Uuid;

/// Competency rating on the closed scale `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Rejects anything outside `1..=10`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every selectable value, ascending.
    pub fn all() -> impl Iterator<Item = RatingValue> {
        (Self::MIN..=Self::MAX).map(RatingValue)
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i64 {
    fn from(value: RatingValue) -> Self {
        i64::from(value.0)
    }
}

impl Display for RatingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// Rating row for one (employee, competency) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyRating {
    pub id: RatingId,
    pub employee_id: EmployeeId,
    pub competency_id: CompetencyId,
    pub rating: RatingValue,
    pub updated_at: i64,
}

/// Free-text note; at most one per employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeNote {
    pub id: NoteId,
    pub employee_id: EmployeeId,
    pub content: String,
    pub updated_at: i64,
}

/// Development goal for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub employee_id: EmployeeId,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Goal joined with its linked competencies (ordered by name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub goal: Goal,
    pub competencies: Vec<Competency>,
}

impl GoalRecord {
    pub fn competency_ids(&self) -> BTreeSet<CompetencyId> {
        self.competencies
            .iter()
            .map(|competency| competency.id)
            .collect()
    }
}

/// Create/edit form for one goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalDraft {
    pub description: String,
    pub competency_ids: BTreeSet<CompetencyId>,
}

impl GoalDraft {
    pub fn new(
        description: impl Into<String>,
        competency_ids: impl IntoIterator<Item = CompetencyId>,
    ) -> Self {
        Self {
            description: description.into(),
            competency_ids: competency_ids.into_iter().collect(),
        }
    }

    /// Pre-fills the form from an existing goal.
    pub fn from_record(record: &GoalRecord) -> Self {
        Self {
            description: record.goal.description.clone(),
            competency_ids: record.competency_ids(),
        }
    }

    /// Adds the competency if absent, removes it otherwise.
    pub fn toggle_competency(&mut self, competency_id: CompetencyId) {
        if !self.competency_ids.remove(&competency_id) {
            self.competency_ids.insert(competency_id);
        }
    }

    /// Description is required; it is trimmed.
    pub fn validate(&self) -> Result<GoalDraft, ValidationError> {
        Ok(Self {
            description: require_text(&self.description, "description")?,
            competency_ids: self.competency_ids.clone(),
        })
    }
}
