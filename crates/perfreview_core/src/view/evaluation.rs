//! Evaluate tab: employee header plus the competencies, notes and goals
//! sub-views of the selected employee.

use super::{log_load_failure, log_refresh_failure, EmployeesView};
use crate::model::employee::EmployeeRecord;
use crate::model::evaluation::{CompetencyRating, GoalDraft, GoalId, GoalRecord};
use crate::model::profile::{Competency, CompetencyId};
use crate::repo::RepoResult;
use crate::selection::{AppTab, EvaluationView, Selection};
use crate::service::evaluation_service::{
    CompetencySheet, EvaluationRepository, EvaluationService,
};
use crate::service::ServiceResult;

/// Competencies of the employee's profile with current ratings.
///
/// `sheet` is `None` until a fetch succeeds, so a failed first load never
/// reads as a profile without competencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetenciesView {
    employee: EmployeeRecord,
    sheet: Option<CompetencySheet>,
    stale: bool,
}

impl CompetenciesView {
    const VIEW: &'static str = "competencies";

    pub fn load<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: EmployeeRecord,
    ) -> Self {
        match service.competency_sheet(&employee) {
            Ok(sheet) => Self {
                employee,
                sheet: Some(sheet),
                stale: false,
            },
            Err(err) => {
                log_load_failure(Self::VIEW, &err);
                Self {
                    employee,
                    sheet: None,
                    stale: true,
                }
            }
        }
    }

    pub fn refresh<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
    ) -> ServiceResult<()> {
        match service.competency_sheet(&self.employee) {
            Ok(sheet) => {
                self.sheet = Some(sheet);
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                log_refresh_failure(Self::VIEW, &err);
                self.stale = true;
                Err(err.into())
            }
        }
    }

    /// Last fetched sheet; `None` when nothing has loaded yet.
    pub fn sheet(&self) -> Option<&CompetencySheet> {
        self.sheet.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rates one competency (1 through 10) and re-fetches the sheet.
    pub fn rate<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        competency_id: CompetencyId,
        rating: i64,
    ) -> ServiceResult<CompetencyRating> {
        let stored = service.rate_competency(self.employee.id(), competency_id, rating)?;
        let _ = self.refresh(service);
        Ok(stored)
    }
}

/// Free-text note of the employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesView {
    employee: EmployeeRecord,
    content: String,
    last_saved: Option<i64>,
    stale: bool,
}

impl NotesView {
    const VIEW: &'static str = "notes";

    pub fn load<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: EmployeeRecord,
    ) -> Self {
        match service.note(employee.id()) {
            Ok(note) => Self {
                employee,
                content: note.map(|note| note.content).unwrap_or_default(),
                last_saved: None,
                stale: false,
            },
            Err(err) => {
                log_load_failure(Self::VIEW, &err);
                Self {
                    employee,
                    content: String::new(),
                    last_saved: None,
                    stale: true,
                }
            }
        }
    }

    pub fn refresh<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
    ) -> ServiceResult<()> {
        match service.note(self.employee.id()) {
            Ok(note) => {
                self.content = note.map(|note| note.content).unwrap_or_default();
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                log_refresh_failure(Self::VIEW, &err);
                self.stale = true;
                Err(err.into())
            }
        }
    }

    /// Stored content, empty when no note exists.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Store timestamp (epoch ms) of the last successful save in this view.
    pub fn last_saved(&self) -> Option<i64> {
        self.last_saved
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn save<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        content: &str,
    ) -> ServiceResult<()> {
        let note = service.save_note(self.employee.id(), content)?;
        self.content = note.content;
        self.last_saved = Some(note.updated_at);
        self.stale = false;
        Ok(())
    }
}

/// Goals of the employee newest first, with linkable competencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalsView {
    employee: EmployeeRecord,
    goals: Vec<GoalRecord>,
    available: Vec<Competency>,
    stale: bool,
}

impl GoalsView {
    const VIEW: &'static str = "goals";

    fn fetch<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: &EmployeeRecord,
    ) -> RepoResult<(Vec<GoalRecord>, Vec<Competency>)> {
        Ok((
            service.goals(employee.id())?,
            service.linkable_competencies(employee)?,
        ))
    }

    pub fn load<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: EmployeeRecord,
    ) -> Self {
        match Self::fetch(service, &employee) {
            Ok((goals, available)) => Self {
                employee,
                goals,
                available,
                stale: false,
            },
            Err(err) => {
                log_load_failure(Self::VIEW, &err);
                Self {
                    employee,
                    goals: Vec::new(),
                    available: Vec::new(),
                    stale: true,
                }
            }
        }
    }

    pub fn refresh<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
    ) -> ServiceResult<()> {
        match Self::fetch(service, &self.employee) {
            Ok((goals, available)) => {
                self.goals = goals;
                self.available = available;
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                log_refresh_failure(Self::VIEW, &err);
                self.stale = true;
                Err(err.into())
            }
        }
    }

    pub fn goals(&self) -> &[GoalRecord] {
        &self.goals
    }

    /// Competencies of the employee's profile, alphabetical; empty when
    /// no profile is assigned.
    pub fn available_competencies(&self) -> &[Competency] {
        &self.available
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn edit_form(&self, goal_id: GoalId) -> Option<GoalDraft> {
        self.goals
            .iter()
            .find(|record| record.goal.id == goal_id)
            .map(GoalDraft::from_record)
    }

    pub fn create<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        form: &GoalDraft,
    ) -> ServiceResult<GoalId> {
        let created = service.create_goal(self.employee.id(), form)?;
        let _ = self.refresh(service);
        Ok(created.goal.id)
    }

    pub fn update<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        goal_id: GoalId,
        form: &GoalDraft,
    ) -> ServiceResult<()> {
        service.update_goal(goal_id, form)?;
        let _ = self.refresh(service);
        Ok(())
    }

    pub fn delete<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        goal_id: GoalId,
    ) -> ServiceResult<()> {
        service.delete_goal(goal_id)?;
        let _ = self.refresh(service);
        Ok(())
    }
}

/// Header shown above every evaluate sub-view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeHeader {
    pub name: String,
    pub title: String,
    pub initials: String,
    pub profile_label: String,
}

impl From<&EmployeeRecord> for EmployeeHeader {
    fn from(record: &EmployeeRecord) -> Self {
        Self {
            name: record.employee.name.clone(),
            title: record.employee.title.clone(),
            initials: record.initials(),
            profile_label: record.profile_label().to_string(),
        }
    }
}

/// Loaded content of the active sub-view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationBody {
    Competencies(CompetenciesView),
    Notes(NotesView),
    Goals(GoalsView),
}

impl EvaluationBody {
    fn load<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: EmployeeRecord,
        view: EvaluationView,
    ) -> Self {
        match view {
            EvaluationView::Competencies => {
                Self::Competencies(CompetenciesView::load(service, employee))
            }
            EvaluationView::Notes => Self::Notes(NotesView::load(service, employee)),
            EvaluationView::Goals => Self::Goals(GoalsView::load(service, employee)),
        }
    }

    pub fn view(&self) -> EvaluationView {
        match self {
            Self::Competencies(_) => EvaluationView::Competencies,
            Self::Notes(_) => EvaluationView::Notes,
            Self::Goals(_) => EvaluationView::Goals,
        }
    }
}

/// Evaluate tab of one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPanel {
    employee: EmployeeRecord,
    header: EmployeeHeader,
    body: EvaluationBody,
}

impl EvaluationPanel {
    /// Opens the panel for an employee on the given sub-view.
    pub fn open<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        employee: EmployeeRecord,
        view: EvaluationView,
    ) -> Self {
        let header = EmployeeHeader::from(&employee);
        let body = EvaluationBody::load(service, employee.clone(), view);
        Self {
            employee,
            header,
            body,
        }
    }

    /// Opens the panel for the selected employee, if the evaluate tab is
    /// active and the employee is listed.
    pub fn for_selection<R: EvaluationRepository>(
        service: &EvaluationService<R>,
        selection: &Selection,
        employees: &EmployeesView,
    ) -> Option<Self> {
        if selection.active_tab() != AppTab::Evaluate {
            return None;
        }
        let record = employees.find(selection.selected_employee()?)?;
        Some(Self::open(
            service,
            record.clone(),
            selection.evaluation_view(),
        ))
    }

    pub fn employee(&self) -> &EmployeeRecord {
        &self.employee
    }

    pub fn header(&self) -> &EmployeeHeader {
        &self.header
    }

    pub fn body(&self) -> &EvaluationBody {
        &self.body
    }

    /// Switches the sub-view through `selection` and loads it.
    ///
    /// Returns `false` when `selection` rejects the switch.
    pub fn switch_view<R: EvaluationRepository>(
        &mut self,
        service: &EvaluationService<R>,
        selection: &mut Selection,
        view: EvaluationView,
    ) -> bool {
        if !selection.set_evaluation_view(view) {
            return false;
        }
        if self.body.view() != view {
            self.body = EvaluationBody::load(service, self.employee.clone(), view);
        }
        true
    }
}
