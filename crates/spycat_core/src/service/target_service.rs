//! Target use-case service.
//!
//! # Responsibility
//! - Read and update single targets.
//!
//! # Invariants
//! - Notes freeze is judged on the stored target and mission before the write.
//! - Mission completion is recomputed in the same transaction as the write.

use crate::model::mission::{Target, TargetChanges, TargetId};
use crate::repo::mission_repo::MissionRepository;
use crate::rules::{check_unique_target_names, guard_target_notes};
use crate::service::{read_back, traced, ServiceError, ServiceResult};
use log::info;

/// Target service facade. Targets live inside the mission aggregate, so it
/// works over the mission repository.
pub struct TargetService<R: MissionRepository> {
    repo: R,
}

impl<R: MissionRepository> TargetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_target(&self, id: TargetId) -> ServiceResult<Target> {
        self.repo
            .get_target(id)?
            .ok_or(ServiceError::TargetNotFound(id))
    }

    /// Updates one target.
    ///
    /// `partial = false` requires `name` and `country` in `changes`.
    pub fn update_target(
        &mut self,
        id: TargetId,
        changes: &TargetChanges,
        partial: bool,
    ) -> ServiceResult<Target> {
        traced("target_update", || {
            let stored = self.get_target(id)?;
            let mission = read_back(
                self.repo.get_mission(stored.mission),
                "target owner mission missing",
            )?;

            let changes = changes.normalized()?;
            if !partial {
                changes.require_full()?;
            }
            guard_target_notes(&stored, mission.freezes_notes(), &changes)?;

            let mut updated = stored;
            changes.apply_to(&mut updated);
            check_unique_target_names(mission.targets.iter().map(|sibling| {
                if sibling.id == updated.id {
                    updated.name.as_str()
                } else {
                    sibling.name.as_str()
                }
            }))?;

            self.repo.update_target(&updated)?;
            info!(
                "event=target_update module=service status=persisted target_id={id} mission_id={} is_completed={}",
                updated.mission, updated.is_completed
            );
            read_back(self.repo.get_target(id), "updated target not found in read-back")
        })
    }
}
