//! Core logic for perfreview, a competency-based performance review tool.
//! Profiles define competencies; employees are rated against the
//! competencies of their assigned profile, with notes and goals alongside.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod selection;
pub mod service;
pub mod sync;
pub mod view;

pub use access::{AccessDecision, AccessPolicy, Identity};
pub use config::{AppConfig, ConfigError, StoreConfig};
pub use db::{open_db, open_db_in_memory, open_store, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::employee::{Employee, EmployeeDraft, EmployeeId, EmployeeRecord};
pub use model::evaluation::{GoalDraft, GoalRecord, RatingValue};
pub use model::profile::{CompetencyDraft, ProfileDraft, ProfileId, ProfileWithCompetencies};
pub use model::validation::ValidationError;
pub use repo::sqlite::SqliteReviewRepository;
pub use repo::{RepoError, RepoResult};
pub use selection::{AppTab, EvaluationView, Selection};
pub use service::employee_service::EmployeeService;
pub use service::evaluation_service::{CompetencySheet, EvaluationService};
pub use service::profile_service::ProfileService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
