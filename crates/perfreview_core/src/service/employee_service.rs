//! Employee use-case service.

use super::{ServiceError, ServiceResult};
use crate::model::employee::{EmployeeDraft, EmployeeId, EmployeeRecord};
use crate::model::profile::Profile;
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::profile_repo::{ProfileOrder, ProfileRepository};
use crate::repo::RepoResult;
use log::info;

/// Employee service facade over repository implementations.
pub struct EmployeeService<R: EmployeeRepository + ProfileRepository> {
    repo: R,
}

impl<R: EmployeeRepository + ProfileRepository> EmployeeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Employees newest first, joined with their profile.
    pub fn list_employees(&self) -> RepoResult<Vec<EmployeeRecord>> {
        self.repo.list_employees()
    }

    /// Profiles offered in the assignment picker, alphabetical.
    pub fn assignable_profiles(&self) -> RepoResult<Vec<Profile>> {
        self.repo.list_profiles(ProfileOrder::NameAsc)
    }

    pub fn get_employee(&self, id: EmployeeId) -> ServiceResult<EmployeeRecord> {
        self.repo.get_employee(id)?.ok_or(ServiceError::NotFound {
            entity: "employee",
            id,
        })
    }

    pub fn create_employee(&self, draft: &EmployeeDraft) -> ServiceResult<EmployeeRecord> {
        let valid = draft.validate()?;
        let employee = self.repo.insert_employee(&valid)?;
        info!(
            "event=employee_create module=service status=ok employee_id={} assigned={}",
            employee.id,
            employee.profile_id.is_some()
        );
        self.get_employee(employee.id)
    }

    pub fn update_employee(
        &self,
        id: EmployeeId,
        draft: &EmployeeDraft,
    ) -> ServiceResult<EmployeeRecord> {
        let valid = draft.validate()?;
        self.repo.update_employee(id, &valid)?;
        self.get_employee(id)
    }

    /// Deletes an employee with its note, ratings and goals.
    pub fn delete_employee(&self, id: EmployeeId) -> ServiceResult<()> {
        self.repo.delete_employee(id)?;
        info!("event=employee_delete module=service status=ok employee_id={id}");
        Ok(())
    }
}
