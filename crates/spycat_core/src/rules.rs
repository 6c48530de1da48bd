//! Business rules for cat, mission and target mutations.
//!
//! # Responsibility
//! - Decide whether a mutation is allowed, before storage is touched.
//! - Derive mission completion from target states.
//!
//! # Invariants
//! - Every function here is pure: it reads the state it is given and returns a
//!   verdict. Persistence and ordering belong to services and repositories.
//! - Each violation maps to one stable, client-visible `code()`.

use crate::model::cat::CatId;
use crate::model::mission::{Mission, MissionId, Target, TargetChanges, TargetId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inclusive bounds on the number of targets a mission owns.
pub const MIN_TARGETS: usize = 1;
pub const MAX_TARGETS: usize = 3;

/// Rejected mutation, scoped to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// Breed not present in a reachable reference catalog.
    InvalidBreed(String),
    /// Partial cat update touched something other than `salary`.
    OnlySalaryEditable { fields: Vec<String> },
    /// Notes change on a completed target or mission.
    NotesFrozen { target: TargetId },
    /// Mission target list outside `MIN_TARGETS..=MAX_TARGETS`.
    InvalidTargetCount { count: usize },
    /// Cat is already the active cat of another mission.
    CatAlreadyAssigned { cat: CatId },
    /// Mission still has a cat and cannot be deleted.
    MissionAssignedCannotDelete { mission: MissionId, cat: CatId },
    /// Two targets of one mission would share a name.
    DuplicateTargetName { name: String },
}

impl RuleViolation {
    /// Stable error code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBreed(_) => "INVALID_BREED",
            Self::OnlySalaryEditable { .. } => "ONLY_SALARY_EDITABLE",
            Self::NotesFrozen { .. } => "NOTES_FROZEN",
            Self::InvalidTargetCount { .. } => "INVALID_TARGET_COUNT",
            Self::CatAlreadyAssigned { .. } => "CAT_ALREADY_ASSIGNED",
            Self::MissionAssignedCannotDelete { .. } => "MISSION_ASSIGNED_CANNOT_DELETE",
            Self::DuplicateTargetName { .. } => "DUPLICATE_TARGET_NAME",
        }
    }

    /// Input field the violation is about, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidBreed(_) => Some("breed"),
            Self::NotesFrozen { .. } => Some("notes"),
            Self::InvalidTargetCount { .. } | Self::DuplicateTargetName { .. } => Some("targets"),
            Self::CatAlreadyAssigned { .. } => Some("cat"),
            Self::OnlySalaryEditable { .. } | Self::MissionAssignedCannotDelete { .. } => None,
        }
    }
}

impl Display for RuleViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBreed(breed) => write!(f, "`{breed}` is not a valid cat breed"),
            Self::OnlySalaryEditable { fields } => write!(
                f,
                "only `salary` can be updated partially, got [{}]",
                fields.join(", ")
            ),
            Self::NotesFrozen { target } => write!(
                f,
                "notes are frozen because target {target} or its mission is complete"
            ),
            Self::InvalidTargetCount { count } => write!(
                f,
                "a mission must have {MIN_TARGETS}-{MAX_TARGETS} targets, got {count}"
            ),
            Self::CatAlreadyAssigned { cat } => {
                write!(f, "cat {cat} is already assigned to another mission")
            }
            Self::MissionAssignedCannotDelete { mission, cat } => write!(
                f,
                "mission {mission} is assigned to cat {cat} and cannot be deleted"
            ),
            Self::DuplicateTargetName { name } => {
                write!(f, "target name `{name}` is already used in this mission")
            }
        }
    }
}

impl Error for RuleViolation {}

/// Snapshot of the breed reference catalog for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreedLookup {
    /// Catalog answered; names are matched exactly.
    Known(Vec<String>),
    /// Catalog disabled or unreachable; breed check is skipped.
    Unavailable,
}

/// Accepts `breed` when the catalog lists it or could not be consulted.
pub fn check_breed(breed: &str, lookup: &BreedLookup) -> Result<(), RuleViolation> {
    match lookup {
        BreedLookup::Known(names) if !names.iter().any(|name| name == breed) => {
            Err(RuleViolation::InvalidBreed(breed.to_string()))
        }
        _ => Ok(()),
    }
}

/// Partial cat updates must carry exactly the `salary` field.
pub fn guard_cat_patch(fields: &[String]) -> Result<(), RuleViolation> {
    let only_salary = !fields.is_empty() && fields.iter().all(|field| field == "salary");
    if only_salary {
        Ok(())
    } else {
        Err(RuleViolation::OnlySalaryEditable {
            fields: fields.to_vec(),
        })
    }
}

/// Rejects a notes change once the target or its mission is complete.
///
/// `is_completed` changes and notes equal to the stored value pass.
pub fn guard_target_notes(
    target: &Target,
    mission_completed: bool,
    changes: &TargetChanges,
) -> Result<(), RuleViolation> {
    let frozen = target.freezes_notes() || mission_completed;
    match changes.notes.as_deref() {
        Some(notes) if frozen && notes != target.notes => {
            Err(RuleViolation::NotesFrozen { target: target.id })
        }
        _ => Ok(()),
    }
}

pub fn check_target_count(count: usize) -> Result<(), RuleViolation> {
    if (MIN_TARGETS..=MAX_TARGETS).contains(&count) {
        Ok(())
    } else {
        Err(RuleViolation::InvalidTargetCount { count })
    }
}

/// One cat, one mission.
///
/// `current_holder` is the mission the cat is linked to right now, if any.
/// Re-linking a cat to the mission that already holds it is a no-op.
pub fn check_assignment(
    cat: CatId,
    mission: MissionId,
    current_holder: Option<MissionId>,
) -> Result<(), RuleViolation> {
    match current_holder {
        Some(holder) if holder != mission => Err(RuleViolation::CatAlreadyAssigned { cat }),
        _ => Ok(()),
    }
}

pub fn check_mission_deletable(mission: &Mission) -> Result<(), RuleViolation> {
    match mission.cat {
        Some(cat) => Err(RuleViolation::MissionAssignedCannotDelete {
            mission: mission.id,
            cat,
        }),
        None => Ok(()),
    }
}

/// Rejects the first name that appears twice in `names`.
pub fn check_unique_target_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), RuleViolation> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RuleViolation::DuplicateTargetName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A mission is complete iff no owned target is still open.
pub fn derive_mission_completion(target_states: impl IntoIterator<Item = bool>) -> bool {
    target_states.into_iter().all(|is_completed| is_completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn target(is_completed: bool, notes: &str) -> Target {
        Target {
            id: Uuid::new_v4(),
            mission: Uuid::new_v4(),
            name: "Target Alpha".to_string(),
            country: "Ukraine".to_string(),
            notes: notes.to_string(),
            is_completed,
        }
    }

    fn notes_change(notes: &str) -> TargetChanges {
        TargetChanges {
            notes: Some(notes.to_string()),
            ..TargetChanges::default()
        }
    }

    #[test]
    fn cat_patch_accepts_salary_only() {
        assert!(guard_cat_patch(&["salary".to_string()]).is_ok());

        let err = guard_cat_patch(&["name".to_string()]).unwrap_err();
        assert_eq!(err.code(), "ONLY_SALARY_EDITABLE");
        assert_eq!(err.field(), None);
        assert!(err.to_string().contains("name"));
        assert!(guard_cat_patch(&["salary".to_string(), "breed".to_string()]).is_err());
        assert!(guard_cat_patch(&[]).is_err());
    }

    #[test]
    fn notes_freeze_only_blocks_changed_values() {
        let done = target(true, "intel");
        assert_eq!(
            guard_target_notes(&done, false, &notes_change("new intel"))
                .unwrap_err()
                .code(),
            "NOTES_FROZEN"
        );
        assert!(guard_target_notes(&done, false, &notes_change("intel")).is_ok());

        let completion_only = TargetChanges {
            is_completed: Some(true),
            ..TargetChanges::default()
        };
        assert!(guard_target_notes(&done, true, &completion_only).is_ok());
    }

    #[test]
    fn completed_mission_freezes_open_target_notes() {
        let open = target(false, "");
        assert!(guard_target_notes(&open, false, &notes_change("x")).is_ok());
        assert!(guard_target_notes(&open, true, &notes_change("x")).is_err());
    }

    #[test]
    fn target_count_boundaries() {
        assert!(check_target_count(0).is_err());
        assert!(check_target_count(1).is_ok());
        assert!(check_target_count(3).is_ok());
        assert_eq!(
            check_target_count(4).unwrap_err(),
            RuleViolation::InvalidTargetCount { count: 4 }
        );
    }

    #[test]
    fn assignment_allows_same_mission_and_rejects_other() {
        let cat = Uuid::new_v4();
        let mission = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(check_assignment(cat, mission, None).is_ok());
        assert!(check_assignment(cat, mission, Some(mission)).is_ok());
        assert_eq!(
            check_assignment(cat, mission, Some(other)).unwrap_err(),
            RuleViolation::CatAlreadyAssigned { cat }
        );
    }

    #[test]
    fn breed_check_skips_when_catalog_unavailable() {
        let known = BreedLookup::Known(vec!["Siberian".to_string()]);
        assert!(check_breed("Siberian", &known).is_ok());
        assert_eq!(
            check_breed("Golden Retriever", &known).unwrap_err().code(),
            "INVALID_BREED"
        );
        assert!(check_breed("Golden Retriever", &BreedLookup::Unavailable).is_ok());
    }

    #[test]
    fn duplicate_names_are_reported() {
        assert!(check_unique_target_names(["T1", "T2"]).is_ok());
        assert_eq!(
            check_unique_target_names(["T1", "T2", "T1"]).unwrap_err(),
            RuleViolation::DuplicateTargetName {
                name: "T1".to_string()
            }
        );
    }

    #[test]
    fn completion_requires_every_target_done() {
        assert!(derive_mission_completion([true, true]));
        assert!(!derive_mission_completion([true, false]));
    }
}
