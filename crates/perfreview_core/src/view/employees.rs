//! Employee list view with the profile assignment picker.

use super::{log_load_failure, log_refresh_failure};
use crate::model::employee::{EmployeeDraft, EmployeeId, EmployeeRecord};
use crate::model::profile::Profile;
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoResult;
use crate::selection::Selection;
use crate::service::employee_service::EmployeeService;
use crate::service::ServiceResult;

const VIEW: &str = "employees";

type Listing = (Vec<EmployeeRecord>, Vec<Profile>);

/// Employees newest first plus profiles sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeesView {
    employees: Vec<EmployeeRecord>,
    profiles: Vec<Profile>,
    stale: bool,
}

fn fetch<R>(service: &EmployeeService<R>) -> RepoResult<Listing>
where
    R: EmployeeRepository + ProfileRepository,
{
    Ok((service.list_employees()?, service.assignable_profiles()?))
}

impl EmployeesView {
    pub fn load<R>(service: &EmployeeService<R>) -> Self
    where
        R: EmployeeRepository + ProfileRepository,
    {
        match fetch(service) {
            Ok((employees, profiles)) => Self {
                employees,
                profiles,
                stale: false,
            },
            Err(err) => {
                log_load_failure(VIEW, &err);
                Self {
                    stale: true,
                    ..Self::default()
                }
            }
        }
    }

    pub fn refresh<R>(&mut self, service: &EmployeeService<R>) -> ServiceResult<()>
    where
        R: EmployeeRepository + ProfileRepository,
    {
        match fetch(service) {
            Ok((employees, profiles)) => {
                self.employees = employees;
                self.profiles = profiles;
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                log_refresh_failure(VIEW, &err);
                self.stale = true;
                Err(err.into())
            }
        }
    }

    pub fn employees(&self) -> &[EmployeeRecord] {
        &self.employees
    }

    /// Options of the assignment picker, alphabetical.
    pub fn assignable_profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn find(&self, id: EmployeeId) -> Option<&EmployeeRecord> {
        self.employees.iter().find(|record| record.id() == id)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn edit_form(&self, id: EmployeeId) -> Option<EmployeeDraft> {
        self.find(id).map(EmployeeDraft::from_record)
    }

    /// Selects a listed employee. Unknown ids leave `selection` untouched.
    pub fn select(&self, id: EmployeeId, selection: &mut Selection) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        selection.select_employee(id);
        true
    }

    pub fn create<R>(
        &mut self,
        service: &EmployeeService<R>,
        form: &EmployeeDraft,
    ) -> ServiceResult<EmployeeId>
    where
        R: EmployeeRepository + ProfileRepository,
    {
        let created = service.create_employee(form)?;
        let _ = self.refresh(service);
        Ok(created.id())
    }

    pub fn update<R>(
        &mut self,
        service: &EmployeeService<R>,
        id: EmployeeId,
        form: &EmployeeDraft,
    ) -> ServiceResult<()>
    where
        R: EmployeeRepository + ProfileRepository,
    {
        service.update_employee(id, form)?;
        let _ = self.refresh(service);
        Ok(())
    }

    /// Deletes an employee; clears `selection` when it pointed at them.
    pub fn delete<R>(
        &mut self,
        service: &EmployeeService<R>,
        id: EmployeeId,
        selection: &mut Selection,
    ) -> ServiceResult<()>
    where
        R: EmployeeRepository + ProfileRepository,
    {
        service.delete_employee(id)?;
        selection.on_employee_deleted(id);
        let _ = self.refresh(service);
        Ok(())
    }
}
