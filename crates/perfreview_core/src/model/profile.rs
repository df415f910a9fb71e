//! Profile (role archetype) and competency records.

use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProfileId = Uuid;
pub type CompetencyId = Uuid;

/// Role archetype owning a list of competencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub description: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// One competency owned by exactly one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competency {
    pub id: CompetencyId,
    /// Fixed at insert; never updated.
    pub profile_id: ProfileId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Profile joined with its competencies (ordered by creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileWithCompetencies {
    pub profile: Profile,
    pub competencies: Vec<Competency>,
}

/// Editable competency row inside a profile form.
///
/// `id` is set for rows loaded from an existing profile and `None` for rows
/// added in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetencyDraft {
    pub id: Option<CompetencyId>,
    pub name: String,
    pub description: String,
}

impl CompetencyDraft {
    /// New unsaved row.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Rows with an empty name are dropped before insert.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

impl From<&Competency> for CompetencyDraft {
    fn from(value: &Competency) -> Self {
        Self {
            id: Some(value.id),
            name: value.name.clone(),
            description: value.description.clone(),
        }
    }
}

/// Create/edit form for one profile and its competency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub description: String,
    pub competencies: Vec<CompetencyDraft>,
}

impl Default for ProfileDraft {
    /// A fresh form starts with one empty competency row.
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            competencies: vec![CompetencyDraft::default()],
        }
    }
}

impl ProfileDraft {
    /// Pre-fills the form from an existing profile.
    pub fn from_record(record: &ProfileWithCompetencies) -> Self {
        let competencies = if record.competencies.is_empty() {
            vec![CompetencyDraft::default()]
        } else {
            record.competencies.iter().map(CompetencyDraft::from).collect()
        };
        Self {
            name: record.profile.name.clone(),
            description: record.profile.description.clone(),
            competencies,
        }
    }

    pub fn add_competency(&mut self) {
        self.competencies.push(CompetencyDraft::default());
    }

    /// Removes one row; the last remaining row is kept.
    pub fn remove_competency(&mut self, index: usize) {
        if self.competencies.len() > 1 && index < self.competencies.len() {
            self.competencies.remove(index);
        }
    }

    /// Validates the form and returns its normalized content.
    ///
    /// Name is required. Competency rows with empty names are filtered out;
    /// the rest are trimmed.
    pub fn validate(&self) -> Result<ValidProfileDraft, ValidationError> {
        let name = require_text(&self.name, "name")?;
        let competencies = self
            .competencies
            .iter()
            .filter(|draft| !draft.is_blank())
            .map(CompetencyDraft::trimmed)
            .collect();
        Ok(ValidProfileDraft {
            name,
            description: self.description.trim().to_string(),
            competencies,
        })
    }
}

/// Normalized profile form ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfileDraft {
    pub name: String,
    pub description: String,
    pub competencies: Vec<CompetencyDraft>,
}
