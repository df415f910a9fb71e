//! Read-only view containers for each area of the review app.
//!
//! # Responsibility
//! - Hold the last fetched state of one area.
//! - Route mutations through services, then re-fetch.
//!
//! # Invariants
//! - `load` never fails; a failed fetch is logged and yields empty state.
//! - A failed `refresh` keeps the previous state and marks it stale.
//! - Forms are borrowed, so a rejected or failed submit leaves the caller's
//!   form intact.

pub mod employees;
pub mod evaluation;
pub mod profiles;

pub use employees::EmployeesView;
pub use evaluation::{
    CompetenciesView, EmployeeHeader, EvaluationBody, EvaluationPanel, GoalsView, NotesView,
};
pub use profiles::ProfilesView;

use log::{error, warn};
use std::fmt::Display;

/// Logs a failed initial fetch.
pub(crate) fn log_load_failure(view: &'static str, err: &dyn Display) {
    error!("event=view_load module=view status=error view={view} error={err}");
}

/// Logs a failed re-fetch that left the view stale.
pub(crate) fn log_refresh_failure(view: &'static str, err: &dyn Display) {
    warn!("event=view_refresh module=view status=error view={view} stale=true error={err}");
}
