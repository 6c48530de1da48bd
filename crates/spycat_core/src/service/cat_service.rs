//! Cat use-case service.
//!
//! # Responsibility
//! - Recruit, replace, patch, list and retire cats.
//! - Apply breed validation on create and full replace.
//!
//! # Invariants
//! - Partial updates only ever change `salary`.
//! - Breed validation is advisory: an unavailable catalog accepts the breed.

use crate::model::cat::{normalize_salary, Cat, CatDraft, CatId, CatPatch};
use crate::model::validation::ValidationError;
use crate::repo::cat_repo::CatRepository;
use crate::rules::{check_breed, guard_cat_patch, BreedLookup};
use crate::service::{read_back, traced, ServiceError, ServiceResult};
use log::debug;

/// Cat service facade over repository implementations.
pub struct CatService<R: CatRepository> {
    repo: R,
}

impl<R: CatRepository> CatService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one cat after field validation and the breed check.
    pub fn create_cat(&self, draft: &CatDraft, breeds: &BreedLookup) -> ServiceResult<Cat> {
        traced("cat_create", || {
            let draft = draft.normalized()?;
            check_breed(&draft.breed, breeds)?;

            let cat = Cat::from_draft(draft);
            let cat_id = self.repo.create_cat(&cat)?;
            debug!("event=cat_create module=service status=persisted cat_id={cat_id}");
            read_back(self.repo.get_cat(cat_id), "created cat not found in read-back")
        })
    }

    pub fn get_cat(&self, id: CatId) -> ServiceResult<Cat> {
        self.repo.get_cat(id)?.ok_or(ServiceError::CatNotFound(id))
    }

    pub fn list_cats(&self) -> ServiceResult<Vec<Cat>> {
        Ok(self.repo.list_cats()?)
    }

    /// Replaces every field of an existing cat.
    pub fn replace_cat(
        &self,
        id: CatId,
        draft: &CatDraft,
        breeds: &BreedLookup,
    ) -> ServiceResult<Cat> {
        traced("cat_replace", || {
            self.get_cat(id)?;
            let draft = draft.normalized()?;
            check_breed(&draft.breed, breeds)?;

            self.repo.update_cat(&Cat::with_id(id, draft))?;
            read_back(self.repo.get_cat(id), "replaced cat not found in read-back")
        })
    }

    /// Applies a partial update, which may only carry `salary`.
    pub fn patch_cat(&self, id: CatId, patch: &CatPatch) -> ServiceResult<Cat> {
        traced("cat_patch", || {
            self.get_cat(id)?;
            guard_cat_patch(&patch.fields)?;
            let salary = patch
                .salary
                .ok_or(ValidationError::Missing { field: "salary" })?;

            self.repo.update_salary(id, normalize_salary(salary)?)?;
            read_back(self.repo.get_cat(id), "patched cat not found in read-back")
        })
    }

    /// Deletes a cat; its mission, if any, stays and becomes unassigned.
    pub fn delete_cat(&self, id: CatId) -> ServiceResult<()> {
        traced("cat_delete", || {
            self.repo.delete_cat(id)?;
            Ok(())
        })
    }
}
