//! Pure set-reconciliation planners.
//!
//! Plans are computed inside the repository transaction from the rows that
//! currently exist, so applying one never observes a half-replaced set.

use crate::model::profile::{CompetencyDraft, CompetencyId};
use std::collections::BTreeSet;

/// Minimal link changes turning the current set into the desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    /// Present now, absent from the desired set.
    pub remove: Vec<CompetencyId>,
    /// Desired, not present now.
    pub add: Vec<CompetencyId>,
    /// Present in both; left untouched.
    pub keep: Vec<CompetencyId>,
}

impl LinkPlan {
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Computes the symmetric difference between two link sets.
pub fn plan_link_changes(
    current: &BTreeSet<CompetencyId>,
    desired: &BTreeSet<CompetencyId>,
) -> LinkPlan {
    LinkPlan {
        remove: current.difference(desired).copied().collect(),
        add: desired.difference(current).copied().collect(),
        keep: current.intersection(desired).copied().collect(),
    }
}

/// Row changes reconciling a profile's competencies with an edited list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetencyPlan {
    /// Existing rows rewritten in place.
    pub update: Vec<(CompetencyId, CompetencyDraft)>,
    /// New rows, in form order.
    pub insert: Vec<CompetencyDraft>,
    /// Existing rows no longer in the form.
    pub delete: Vec<CompetencyId>,
}

/// Matches drafts to existing rows by id.
///
/// A draft whose id is not owned by the profile, or repeats an id already
/// matched, becomes an insert. Blank drafts are ignored.
pub fn plan_competency_changes(
    existing: &[CompetencyId],
    drafts: &[CompetencyDraft],
) -> CompetencyPlan {
    let owned: BTreeSet<CompetencyId> = existing.iter().copied().collect();
    let mut matched = BTreeSet::new();
    let mut plan = CompetencyPlan::default();

    for draft in drafts.iter().filter(|draft| !draft.is_blank()) {
        match draft.id {
            Some(id) if owned.contains(&id) && matched.insert(id) => {
                plan.update.push((id, draft.clone()));
            }
            _ => plan.insert.push(CompetencyDraft {
                id: None,
                ..draft.clone()
            }),
        }
    }

    plan.delete = existing
        .iter()
        .copied()
        .filter(|id| !matched.contains(id))
        .collect();
    plan
}

#[cfg(test)]
mod tests {
    use super::{plan_competency_changes, plan_link_changes};
    use crate::model::profile::CompetencyDraft;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    #[test]
    fn link_plan_is_symmetric_difference() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let current = BTreeSet::from([a, b]);
        let desired = BTreeSet::from([b, c]);

        let plan = plan_link_changes(&current, &desired);
        assert_eq!(plan.remove, vec![a]);
        assert_eq!(plan.add, vec![c]);
        assert_eq!(plan.keep, vec![b]);
        assert!(!plan.is_noop());
        assert!(plan_link_changes(&desired, &desired).is_noop());
    }

    #[test]
    fn competency_plan_matches_by_id_and_inserts_unknown_rows() {
        let (kept, dropped, foreign) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let drafts = vec![
            CompetencyDraft {
                id: Some(kept),
                name: "Code Quality".to_string(),
                description: String::new(),
            },
            CompetencyDraft {
                id: Some(kept),
                name: "Duplicate".to_string(),
                description: String::new(),
            },
            CompetencyDraft {
                id: Some(foreign),
                name: "Copied".to_string(),
                description: String::new(),
            },
            CompetencyDraft::new("  ", "blank rows are skipped"),
            CompetencyDraft::new("Mentoring", ""),
        ];

        let plan = plan_competency_changes(&[kept, dropped], &drafts);
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].0, kept);
        assert_eq!(
            plan.insert
                .iter()
                .map(|draft| draft.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Duplicate", "Copied", "Mentoring"]
        );
        assert!(plan.insert.iter().all(|draft| draft.id.is_none()));
        assert_eq!(plan.delete, vec![dropped]);
    }
}
