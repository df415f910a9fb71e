//! Explicit selection context shared by view containers.
//!
//! # Invariants
//! - `Evaluate` is active only while an employee is selected.
//! - Selecting an employee always opens `Evaluate` on the competencies view.
//! - Deleting the selected employee clears the selection and returns to
//!   `Employees`.

use crate::model::employee::EmployeeId;
use serde::{Deserialize, Serialize};

/// Top-level tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppTab {
    Profiles,
    #[default]
    Employees,
    /// Requires a selected employee.
    Evaluate,
}

/// Sub-views of the evaluate tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationView {
    #[default]
    Competencies,
    Notes,
    Goals,
}

/// What is selected and which tab is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active_tab: AppTab,
    selected_employee: Option<EmployeeId>,
    evaluation_view: EvaluationView,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> AppTab {
        self.active_tab
    }

    pub fn selected_employee(&self) -> Option<EmployeeId> {
        self.selected_employee
    }

    pub fn evaluation_view(&self) -> EvaluationView {
        self.evaluation_view
    }

    /// Whether the evaluate tab can be offered.
    pub fn can_evaluate(&self) -> bool {
        self.selected_employee.is_some()
    }

    /// Selects an employee and opens the evaluate tab.
    pub fn select_employee(&mut self, employee_id: EmployeeId) {
        self.selected_employee = Some(employee_id);
        self.active_tab = AppTab::Evaluate;
        self.evaluation_view = EvaluationView::Competencies;
    }

    /// Clears the selection; leaves `Evaluate` for `Employees`.
    pub fn clear_selection(&mut self) {
        self.selected_employee = None;
        self.evaluation_view = EvaluationView::Competencies;
        if self.active_tab == AppTab::Evaluate {
            self.active_tab = AppTab::Employees;
        }
    }

    /// Reacts to an employee deletion. Returns `true` when the selection changed.
    pub fn on_employee_deleted(&mut self, employee_id: EmployeeId) -> bool {
        if self.selected_employee != Some(employee_id) {
            return false;
        }
        self.clear_selection();
        self.active_tab = AppTab::Employees;
        true
    }

    /// Switches tabs. Returns `false` (and changes nothing) when `Evaluate` is
    /// requested without a selection.
    pub fn set_tab(&mut self, tab: AppTab) -> bool {
        if tab == AppTab::Evaluate && !self.can_evaluate() {
            return false;
        }
        if tab == AppTab::Evaluate && self.active_tab != AppTab::Evaluate {
            self.evaluation_view = EvaluationView::Competencies;
        }
        self.active_tab = tab;
        true
    }

    /// Switches the evaluate sub-view. Returns `false` outside `Evaluate`.
    pub fn set_evaluation_view(&mut self, view: EvaluationView) -> bool {
        if self.active_tab != AppTab::Evaluate {
            return false;
        }
        self.evaluation_view = view;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{AppTab, EvaluationView, Selection};
    use uuid::Uuid;

    #[test]
    fn starts_on_employees_without_selection() {
        let selection = Selection::new();
        assert_eq!(selection.active_tab(), AppTab::Employees);
        assert_eq!(selection.selected_employee(), None);
        assert!(!selection.can_evaluate());
    }

    #[test]
    fn selecting_employee_forces_evaluate_and_resets_sub_view() {
        let mut selection = Selection::new();
        let first = Uuid::new_v4();
        selection.select_employee(first);
        assert!(selection.set_evaluation_view(EvaluationView::Goals));

        let second = Uuid::new_v4();
        selection.set_tab(AppTab::Profiles);
        selection.select_employee(second);
        assert_eq!(selection.active_tab(), AppTab::Evaluate);
        assert_eq!(selection.selected_employee(), Some(second));
        assert_eq!(selection.evaluation_view(), EvaluationView::Competencies);
    }

    #[test]
    fn evaluate_tab_requires_selection() {
        let mut selection = Selection::new();
        assert!(!selection.set_tab(AppTab::Evaluate));
        assert_eq!(selection.active_tab(), AppTab::Employees);
        assert!(!selection.set_evaluation_view(EvaluationView::Notes));
    }

    #[test]
    fn deleting_selected_employee_bounces_to_employees() {
        let mut selection = Selection::new();
        let selected = Uuid::new_v4();
        selection.select_employee(selected);

        assert!(!selection.on_employee_deleted(Uuid::new_v4()));
        assert_eq!(selection.active_tab(), AppTab::Evaluate);

        selection.set_tab(AppTab::Profiles);
        assert!(selection.on_employee_deleted(selected));
        assert_eq!(selection.selected_employee(), None);
        assert_eq!(selection.active_tab(), AppTab::Employees);
    }
}
