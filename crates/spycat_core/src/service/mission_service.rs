//! Mission use-case service.
//!
//! # Responsibility
//! - Create missions with their initial targets.
//! - Assign cats, apply composite updates, and delete unassigned missions.
//!
//! # Invariants
//! - Target cardinality is checked before any other rule or write.
//! - A cat is linked to at most one mission.
//! - A composite update is planned completely in memory, then applied by the
//!   repository in one transaction; a failing entry leaves nothing behind.

use crate::model::cat::CatId;
use crate::model::mission::{
    Mission, MissionChanges, MissionDraft, MissionId, TargetEntry, TargetId,
};
use crate::model::validation::ValidationError;
use crate::repo::mission_repo::{MissionRepository, MissionUpdatePlan};
use crate::rules::{
    check_assignment, check_mission_deletable, check_target_count, check_unique_target_names,
    derive_mission_completion, guard_target_notes, RuleViolation,
};
use crate::service::{read_back, traced, ServiceError, ServiceResult};
use log::info;
use std::collections::HashSet;
use uuid::Uuid;

/// Mission service facade over repository implementations.
pub struct MissionService<R: MissionRepository> {
    repo: R,
}

impl<R: MissionRepository> MissionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a mission and its 1-3 targets in one write.
    pub fn create_mission(&mut self, draft: &MissionDraft) -> ServiceResult<Mission> {
        traced("mission_create", || {
            check_target_count(draft.targets.len())?;
            let drafts = draft
                .targets
                .iter()
                .map(|target| target.normalized())
                .collect::<Result<Vec<_>, _>>()?;
            check_unique_target_names(drafts.iter().map(|target| target.name.as_str()))?;

            let mission_id = Uuid::new_v4();
            if let Some(cat) = draft.cat {
                self.ensure_cat_available(cat, mission_id)?;
            }

            let targets: Vec<_> = drafts
                .into_iter()
                .map(|target| target.into_target(mission_id))
                .collect();
            let mission = Mission {
                id: mission_id,
                cat: draft.cat,
                is_completed: derive_mission_completion(
                    targets.iter().map(|target| target.is_completed),
                ),
                targets,
            };

            self.repo.create_mission(&mission)?;
            info!(
                "event=mission_create module=service status=persisted mission_id={mission_id} target_count={}",
                mission.targets.len()
            );
            read_back(
                self.repo.get_mission(mission_id),
                "created mission not found in read-back",
            )
        })
    }

    pub fn get_mission(&self, id: MissionId) -> ServiceResult<Mission> {
        self.repo
            .get_mission(id)?
            .ok_or(ServiceError::MissionNotFound(id))
    }

    pub fn list_missions(&self) -> ServiceResult<Vec<Mission>> {
        Ok(self.repo.list_missions()?)
    }

    /// Links `cat` to `mission`.
    ///
    /// Re-assigning a cat to the mission it already holds succeeds without a
    /// write.
    pub fn assign_cat(&mut self, mission: MissionId, cat: CatId) -> ServiceResult<Mission> {
        traced("mission_assign_cat", || {
            let current = self.get_mission(mission)?;
            if !self.repo.cat_exists(cat)? {
                return Err(ServiceError::CatNotFound(cat));
            }
            let holder = self.repo.mission_for_cat(cat)?;
            check_assignment(cat, mission, holder)?;

            if current.cat != Some(cat) {
                self.repo.set_mission_cat(mission, Some(cat))?;
                info!(
                    "event=mission_assign_cat module=service status=persisted mission_id={mission} cat_id={cat}"
                );
            }
            read_back(
                self.repo.get_mission(mission),
                "assigned mission not found in read-back",
            )
        })
    }

    /// Applies a composite update.
    ///
    /// `partial = false` is a full replace: `targets` is required and entries
    /// with an id must carry `name` and `country`.
    pub fn update_mission(
        &mut self,
        id: MissionId,
        changes: &MissionChanges,
        partial: bool,
    ) -> ServiceResult<Mission> {
        traced("mission_update", || {
            let mission = self.get_mission(id)?;
            if !partial && changes.targets.is_none() {
                return Err(ValidationError::Missing { field: "targets" }.into());
            }
            if let Some(entries) = &changes.targets {
                check_target_count(entries.len())?;
            }
            if let Some(Some(cat)) = changes.cat {
                self.ensure_cat_available(cat, id)?;
            }

            let mut plan = match &changes.targets {
                Some(entries) => plan_target_replacement(&mission, entries, partial)?,
                None => MissionUpdatePlan {
                    mission: id,
                    ..MissionUpdatePlan::default()
                },
            };
            plan.cat = changes.cat;

            self.repo.apply_update(&plan)?;
            info!(
                "event=mission_update module=service status=persisted mission_id={id} updated={} created={} pruned={}",
                plan.updated.len(),
                plan.created.len(),
                plan.pruned.len()
            );
            read_back(
                self.repo.get_mission(id),
                "updated mission not found in read-back",
            )
        })
    }

    /// Deletes an unassigned mission and, by cascade, its targets.
    pub fn delete_mission(&mut self, id: MissionId) -> ServiceResult<()> {
        traced("mission_delete", || {
            let mission = self.get_mission(id)?;
            check_mission_deletable(&mission)?;
            self.repo.delete_mission(id)?;
            Ok(())
        })
    }

    fn ensure_cat_available(&self, cat: CatId, mission: MissionId) -> ServiceResult<()> {
        if !self.repo.cat_exists(cat)? {
            return Err(ServiceError::UnknownCat(cat));
        }
        let holder = self.repo.mission_for_cat(cat)?;
        check_assignment(cat, mission, holder)?;
        Ok(())
    }
}

/// Partitions `entries` into updates and creates and prunes the rest.
///
/// Every entry is checked against the mission as currently stored, so the
/// notes freeze is judged on pre-update completion state.
///
/// Pruned targets still hold their names while updates and creates are
/// written, so a listed name may not reuse the name of a pruned target.
fn plan_target_replacement(
    mission: &Mission,
    entries: &[TargetEntry],
    partial: bool,
) -> ServiceResult<MissionUpdatePlan> {
    let mut plan = MissionUpdatePlan {
        mission: mission.id,
        ..MissionUpdatePlan::default()
    };
    let mut kept: HashSet<TargetId> = HashSet::new();

    for entry in entries {
        let changes = entry.changes.normalized()?;
        match entry.id {
            Some(target_id) => {
                if !kept.insert(target_id) {
                    return Err(ValidationError::DuplicateTargetId(target_id).into());
                }
                let existing = mission
                    .target(target_id)
                    .ok_or(ServiceError::UnknownTarget {
                        mission: mission.id,
                        target: target_id,
                    })?;
                if !partial {
                    changes.require_full()?;
                }
                guard_target_notes(existing, mission.freezes_notes(), &changes)?;

                let mut updated = existing.clone();
                changes.apply_to(&mut updated);
                plan.updated.push(updated);
            }
            None => {
                let draft = changes.into_draft()?;
                plan.created.push(draft.into_target(mission.id));
            }
        }
    }

    plan.pruned = mission
        .targets
        .iter()
        .map(|target| target.id)
        .filter(|id| !kept.contains(id))
        .collect();

    check_unique_target_names(
        plan.updated
            .iter()
            .chain(plan.created.iter())
            .map(|target| target.name.as_str()),
    )?;

    let pruned_names: HashSet<&str> = mission
        .targets
        .iter()
        .filter(|target| !kept.contains(&target.id))
        .map(|target| target.name.as_str())
        .collect();
    if let Some(clash) = plan
        .updated
        .iter()
        .chain(plan.created.iter())
        .find(|target| pruned_names.contains(target.name.as_str()))
    {
        return Err(RuleViolation::DuplicateTargetName {
            name: clash.name.clone(),
        }
        .into());
    }
    Ok(plan)
}
