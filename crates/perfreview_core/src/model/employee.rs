//! Employee records.

use super::initials_of;
use super::profile::{Profile, ProfileId};
use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EmployeeId = Uuid;

/// Label shown for employees without a profile.
pub const NO_PROFILE_LABEL: &str = "No profile assigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub title: String,
    /// `None` means unassigned.
    pub profile_id: Option<ProfileId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Employee joined with the assigned profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee: Employee,
    pub profile: Option<Profile>,
}

impl EmployeeRecord {
    pub fn id(&self) -> EmployeeId {
        self.employee.id
    }

    /// Assigned profile name, or [`NO_PROFILE_LABEL`].
    pub fn profile_label(&self) -> &str {
        self.profile
            .as_ref()
            .map_or(NO_PROFILE_LABEL, |profile| profile.name.as_str())
    }

    /// Avatar initials from the employee name.
    pub fn initials(&self) -> String {
        initials_of(&self.employee.name)
    }
}

/// Create/edit form for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub name: String,
    pub title: String,
    pub profile_id: Option<ProfileId>,
}

impl EmployeeDraft {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        profile_id: Option<ProfileId>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            profile_id,
        }
    }

    /// Pre-fills the form from an existing employee.
    pub fn from_record(record: &EmployeeRecord) -> Self {
        Self::new(
            record.employee.name.clone(),
            record.employee.title.clone(),
            record.employee.profile_id,
        )
    }

    /// Name and title are required; both are trimmed.
    pub fn validate(&self) -> Result<EmployeeDraft, ValidationError> {
        Ok(Self {
            name: require_text(&self.name, "name")?,
            title: require_text(&self.title, "title")?,
            profile_id: self.profile_id,
        })
    }
}
