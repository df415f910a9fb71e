//! Core use-case services.
//!
//! # Responsibility
//! - Validate form input before any store call.
//! - Orchestrate repository calls and association sync into use-cases.
//! - Keep view containers decoupled from storage details.

pub mod employee_service;
pub mod evaluation_service;
pub mod profile_service;

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use crate::sync::SyncError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for review use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before reaching the store.
    Validation(ValidationError),
    /// Target record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Store call failed.
    Store(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Store(err) => write!(f, "operation failed: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent review state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Store(other),
        }
    }
}

impl From<SyncError> for ServiceError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::Store(err) => err.into(),
            SyncError::InconsistentState(details) => Self::InconsistentState(details),
        }
    }
}
