//! Core use-case services.
//!
//! # Responsibility
//! - Run the business rules against current state, then hand a fully
//!   validated write to the repository.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - No repository write happens before every rule for the request passed.
//! - Each public operation emits one `event=<name> module=service` log line
//!   with its outcome.

use crate::model::cat::CatId;
use crate::model::mission::{MissionId, TargetId};
use crate::model::validation::ValidationError;
use crate::repo::{RepoError, RepoResult};
use crate::rules::RuleViolation;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cat_service;
pub mod mission_service;
pub mod target_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by agency use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input field failed model validation.
    Validation(ValidationError),
    /// Business rule rejected the mutation.
    Rule(RuleViolation),
    /// Addressed cat does not exist.
    CatNotFound(CatId),
    /// Addressed mission does not exist.
    MissionNotFound(MissionId),
    /// Addressed target does not exist.
    TargetNotFound(TargetId),
    /// Payload references a cat that does not exist.
    UnknownCat(CatId),
    /// Payload references a target the mission does not own.
    UnknownTarget {
        mission: MissionId,
        target: TargetId,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but the read-back disagrees.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Stable error code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Rule(violation) => violation.code(),
            Self::CatNotFound(_) | Self::UnknownCat(_) => "CAT_NOT_FOUND",
            Self::MissionNotFound(_) => "MISSION_NOT_FOUND",
            Self::TargetNotFound(_) | Self::UnknownTarget { .. } => "TARGET_NOT_FOUND",
            Self::Repo(_) | Self::InconsistentState(_) => "INTERNAL_ERROR",
        }
    }

    /// Offending input field, when the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.field()),
            Self::Rule(violation) => violation.field(),
            Self::UnknownCat(_) => Some("cat"),
            Self::UnknownTarget { .. } => Some("targets"),
            _ => None,
        }
    }

    /// Whether the caller's request was refused, as opposed to the service
    /// failing.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repo(_) | Self::InconsistentState(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Rule(violation) => write!(f, "{violation}"),
            Self::CatNotFound(id) => write!(f, "cat not found: {id}"),
            Self::MissionNotFound(id) => write!(f, "mission not found: {id}"),
            Self::TargetNotFound(id) => write!(f, "target not found: {id}"),
            Self::UnknownCat(id) => write!(f, "cat {id} does not exist"),
            Self::UnknownTarget { mission, target } => {
                write!(f, "target {target} does not belong to mission {mission}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Rule(violation) => Some(violation),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RuleViolation> for ServiceError {
    fn from(value: RuleViolation) -> Self {
        Self::Rule(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CatNotFound(id) => Self::CatNotFound(id),
            RepoError::MissionNotFound(id) => Self::MissionNotFound(id),
            RepoError::TargetNotFound(id) => Self::TargetNotFound(id),
            RepoError::DuplicateTargetName { name, .. } => {
                Self::Rule(RuleViolation::DuplicateTargetName { name })
            }
            RepoError::CatAlreadyAssigned(cat) => {
                Self::Rule(RuleViolation::CatAlreadyAssigned { cat })
            }
            other => Self::Repo(other),
        }
    }
}

/// Runs one use-case and logs its outcome.
fn traced<T>(event: &'static str, op: impl FnOnce() -> ServiceResult<T>) -> ServiceResult<T> {
    let result = op();
    match &result {
        Ok(_) => info!("event={event} module=service status=ok"),
        Err(err) if err.is_rejection() => info!(
            "event={event} module=service status=rejected error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error error_code={} error={err}",
            err.code()
        ),
    }
    result
}

fn read_back<T>(value: RepoResult<Option<T>>, details: &'static str) -> ServiceResult<T> {
    value?.ok_or(ServiceError::InconsistentState(details))
}
