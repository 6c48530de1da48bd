//! Mission and target domain model.
//!
//! # Responsibility
//! - Define the mission aggregate (mission row plus its owned targets).
//! - Define create drafts and change sets for missions and targets.
//!
//! # Invariants
//! - A target belongs to exactly one mission for its whole lifetime.
//! - `Mission::is_completed` is derived from targets and never read from input.
//! - `MissionChanges::cat` distinguishes "absent" (`None`) from explicit
//!   `null` (`Some(None)`).

use crate::model::cat::CatId;
use crate::model::validation::{normalize_text, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type MissionId = Uuid;
pub type TargetId = Uuid;

/// Mission aggregate as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub cat: Option<CatId>,
    pub is_completed: bool,
    /// Ordered by creation.
    pub targets: Vec<Target>,
}

/// Target owned by one mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub mission: MissionId,
    pub name: String,
    pub country: String,
    pub notes: String,
    pub is_completed: bool,
}

impl Mission {
    /// Whether the notes of targets in this mission are frozen mission-wide.
    pub fn freezes_notes(&self) -> bool {
        self.is_completed
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|target| target.id == id)
    }
}

impl Target {
    /// Whether this target's own state freezes its notes.
    pub fn freezes_notes(&self) -> bool {
        self.is_completed
    }
}

/// New target payload used at mission create and for id-less update entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDraft {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl TargetDraft {
    /// Returns a trimmed copy or the first field violation.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_text("name", &self.name)?,
            country: normalize_text("country", &self.country)?,
            notes: self.notes.clone(),
            is_completed: self.is_completed,
        })
    }

    /// Materializes the draft as a target owned by `mission`.
    pub fn into_target(self, mission: MissionId) -> Target {
        Target {
            id: Uuid::new_v4(),
            mission,
            name: self.name,
            country: self.country,
            notes: self.notes,
            is_completed: self.is_completed,
        }
    }
}

/// Field-level target change set. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl TargetChanges {
    /// Returns a copy with present text fields trimmed and checked.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|value| normalize_text("name", value))
                .transpose()?,
            country: self
                .country
                .as_deref()
                .map(|value| normalize_text("country", value))
                .transpose()?,
            notes: self.notes.clone(),
            is_completed: self.is_completed,
        })
    }

    /// Requires the fields a full (non-partial) target write must carry.
    pub fn require_full(&self) -> Result<(), ValidationError> {
        if self.name.is_none() {
            return Err(ValidationError::Missing { field: "name" });
        }
        if self.country.is_none() {
            return Err(ValidationError::Missing { field: "country" });
        }
        Ok(())
    }

    /// Converts an id-less entry into a draft for a new target.
    pub fn into_draft(self) -> Result<TargetDraft, ValidationError> {
        self.require_full()?;
        Ok(TargetDraft {
            name: self.name.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            is_completed: self.is_completed.unwrap_or(false),
        })
    }

    /// Applies present fields onto `target`.
    pub fn apply_to(&self, target: &mut Target) {
        if let Some(name) = &self.name {
            target.name.clone_from(name);
        }
        if let Some(country) = &self.country {
            target.country.clone_from(country);
        }
        if let Some(notes) = &self.notes {
            target.notes.clone_from(notes);
        }
        if let Some(is_completed) = self.is_completed {
            target.is_completed = is_completed;
        }
    }
}

/// One element of the `targets` list in a mission update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Present: update this existing target. Absent: create a new target.
    #[serde(default)]
    pub id: Option<TargetId>,
    #[serde(flatten)]
    pub changes: TargetChanges,
}

/// Mission create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDraft {
    #[serde(default)]
    pub cat: Option<CatId>,
    pub targets: Vec<TargetDraft>,
}

/// Mission update payload shared by full replace and partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionChanges {
    #[serde(default, deserialize_with = "present_or_null")]
    pub cat: Option<Option<CatId>>,
    #[serde(default)]
    pub targets: Option<Vec<TargetEntry>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<CatId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<CatId>::deserialize(deserializer).map(Some)
}
