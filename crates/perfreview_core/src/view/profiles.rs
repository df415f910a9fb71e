//! Profile management view.

use super::{log_load_failure, log_refresh_failure};
use crate::model::profile::{ProfileDraft, ProfileId, ProfileWithCompetencies};
use crate::repo::profile_repo::ProfileRepository;
use crate::service::profile_service::ProfileService;
use crate::service::ServiceResult;

const VIEW: &str = "profiles";

/// Profiles newest first, each with competencies in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilesView {
    profiles: Vec<ProfileWithCompetencies>,
    stale: bool,
}

impl ProfilesView {
    pub fn load<R: ProfileRepository>(service: &ProfileService<R>) -> Self {
        match service.list_profiles_with_competencies() {
            Ok(profiles) => Self {
                profiles,
                stale: false,
            },
            Err(err) => {
                log_load_failure(VIEW, &err);
                Self {
                    profiles: Vec::new(),
                    stale: true,
                }
            }
        }
    }

    pub fn refresh<R: ProfileRepository>(
        &mut self,
        service: &ProfileService<R>,
    ) -> ServiceResult<()> {
        match service.list_profiles_with_competencies() {
            Ok(profiles) => {
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

    pub fn profiles(&self) -> &[ProfileWithCompetencies] {
        &self.profiles
    }

    pub fn find(&self, id: ProfileId) -> Option<&ProfileWithCompetencies> {
        self.profiles.iter().find(|entry| entry.profile.id == id)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Form pre-filled from a listed profile.
    pub fn edit_form(&self, id: ProfileId) -> Option<ProfileDraft> {
        self.find(id).map(ProfileDraft::from_record)
    }

    pub fn create<R: ProfileRepository>(
        &mut self,
        service: &ProfileService<R>,
        form: &ProfileDraft,
    ) -> ServiceResult<ProfileId> {
        let created = service.create_profile(form)?;
        let _ = self.refresh(service);
        Ok(created.profile.id)
    }

    pub fn update<R: ProfileRepository>(
        &mut self,
        service: &ProfileService<R>,
        id: ProfileId,
        form: &ProfileDraft,
    ) -> ServiceResult<()> {
        service.update_profile(id, form)?;
        let _ = self.refresh(service);
        Ok(())
    }

    pub fn delete<R: ProfileRepository>(
        &mut self,
        service: &ProfileService<R>,
        id: ProfileId,
    ) -> ServiceResult<()> {
        service.delete_profile(id)?;
        let _ = self.refresh(service);
        Ok(())
    }

    pub fn duplicate<R: ProfileRepository>(
        &mut self,
        service: &ProfileService<R>,
        id: ProfileId,
    ) -> ServiceResult<ProfileId> {
        let copy = service.duplicate_profile(id)?;
        let _ = self.refresh(service);
        Ok(copy.profile.id)
    }
}
