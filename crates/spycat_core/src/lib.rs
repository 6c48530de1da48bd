//! Core domain logic for the Spy Cat Agency backend.
//! This crate is the single source of truth for cat, mission and target
//! business rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rules;
pub mod service;

pub use logging::{default_log_level, init_logging};
pub use model::cat::{Cat, CatDraft, CatId, CatPatch};
pub use model::mission::{
    Mission, MissionChanges, MissionDraft, MissionId, Target, TargetChanges, TargetDraft,
    TargetEntry, TargetId,
};
pub use model::validation::ValidationError;
pub use repo::cat_repo::{CatRepository, SqliteCatRepository};
pub use repo::mission_repo::{MissionRepository, MissionUpdatePlan, SqliteMissionRepository};
pub use repo::{RepoError, RepoResult};
pub use rules::{BreedLookup, RuleViolation};
pub use service::cat_service::CatService;
pub use service::mission_service::MissionService;
pub use service::target_service::TargetService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
