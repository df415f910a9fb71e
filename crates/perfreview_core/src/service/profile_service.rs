//! Profile use-case service.
//!
//! # Responsibility
//! - Create, edit, duplicate and delete profiles with their competency lists.
//! - Provide the grouped profile/competency read model.
//!
//! # Invariants
//! - Profile name is required; blank competency rows never reach the store.
//! - Edits reconcile competencies by id, so ratings and goal links of kept
//!   competencies survive.

use super::{ServiceError, ServiceResult};
use crate::model::profile::{
    Competency, CompetencyDraft, Profile, ProfileDraft, ProfileId, ProfileWithCompetencies,
};
use crate::repo::profile_repo::{CompetencyOrder, CompetencyQuery, ProfileOrder, ProfileRepository};
use crate::repo::RepoResult;
use crate::sync::{replace_profile_competencies, ReplaceMode};
use log::info;
use std::collections::HashMap;

/// Suffix appended to duplicated profile names.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Profile service facade over repository implementations.
pub struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists profiles in the requested order.
    pub fn list_profiles(&self, order: ProfileOrder) -> RepoResult<Vec<Profile>> {
        self.repo.list_profiles(order)
    }

    /// Lists profiles newest first, each with competencies in definition order.
    pub fn list_profiles_with_competencies(&self) -> RepoResult<Vec<ProfileWithCompetencies>> {
        let profiles = self.repo.list_profiles(ProfileOrder::CreatedDesc)?;
        let competencies = self.repo.list_competencies(&CompetencyQuery::default())?;

        let mut grouped: HashMap<ProfileId, Vec<Competency>> = HashMap::new();
        for competency in competencies {
            grouped
                .entry(competency.profile_id)
                .or_default()
                .push(competency);
        }

        Ok(profiles
            .into_iter()
            .map(|profile| ProfileWithCompetencies {
                competencies: grouped.remove(&profile.id).unwrap_or_default(),
                profile,
            })
            .collect())
    }

    /// Gets one profile with its competencies.
    pub fn get_profile(&self, id: ProfileId) -> ServiceResult<ProfileWithCompetencies> {
        let profile = self.repo.get_profile(id)?.ok_or(ServiceError::NotFound {
            entity: "profile",
            id,
        })?;
        let competencies = self.competencies(id, CompetencyOrder::CreatedAsc)?;
        Ok(ProfileWithCompetencies {
            profile,
            competencies,
        })
    }

    /// Lists competencies of one profile.
    pub fn competencies(
        &self,
        profile_id: ProfileId,
        order: CompetencyOrder,
    ) -> RepoResult<Vec<Competency>> {
        self.repo
            .list_competencies(&CompetencyQuery::for_profile(profile_id, order))
    }

    /// Creates a profile and inserts its non-blank competencies.
    pub fn create_profile(&self, draft: &ProfileDraft) -> ServiceResult<ProfileWithCompetencies> {
        let valid = draft.validate()?;
        let profile = self
            .repo
            .insert_profile(valid.name.as_str(), valid.description.as_str())?;
        let competencies = replace_profile_competencies(
            &self.repo,
            profile.id,
            &valid.competencies,
            ReplaceMode::Create,
        )?;
        info!(
            "event=profile_create module=service status=ok profile_id={} competencies={}",
            profile.id,
            competencies.len()
        );
        Ok(ProfileWithCompetencies {
            profile,
            competencies,
        })
    }

    /// Updates a profile and reconciles its competency list with the form.
    ///
    /// Header and competencies are written in one transaction; on failure
    /// the stored profile is left exactly as it was.
    pub fn update_profile(
        &self,
        id: ProfileId,
        draft: &ProfileDraft,
    ) -> ServiceResult<ProfileWithCompetencies> {
        let valid = draft.validate()?;
        replace_profile_competencies(
            &self.repo,
            id,
            &valid.competencies,
            ReplaceMode::Edit {
                name: valid.name.as_str(),
                description: valid.description.as_str(),
            },
        )?;
        self.get_profile(id)
    }

    /// Deletes a profile; its competencies go with it.
    pub fn delete_profile(&self, id: ProfileId) -> ServiceResult<()> {
        self.repo.delete_profile(id)?;
        info!("event=profile_delete module=service status=ok profile_id={id}");
        Ok(())
    }

    /// Copies a profile as `"<name> (Copy)"` together with its competencies.
    pub fn duplicate_profile(&self, id: ProfileId) -> ServiceResult<ProfileWithCompetencies> {
        let source = self.get_profile(id)?;
        let copy = self.repo.insert_profile(
            format!("{}{COPY_SUFFIX}", source.profile.name).as_str(),
            source.profile.description.as_str(),
        )?;
        let drafts: Vec<CompetencyDraft> = source
            .competencies
            .iter()
            .map(|competency| CompetencyDraft::new(&competency.name, &competency.description))
            .collect();
        let competencies =
            replace_profile_competencies(&self.repo, copy.id, &drafts, ReplaceMode::Create)?;
        info!(
            "event=profile_duplicate module=service status=ok source_id={} profile_id={}",
            id, copy.id
        );
        Ok(ProfileWithCompetencies {
            profile: copy,
            competencies,
        })
    }
}
