//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for cats and missions.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Multi-row writes run in one `IMMEDIATE` transaction.
//! - Repository APIs return semantic errors (`*NotFound`, duplicates) in
//!   addition to DB transport errors.

use crate::db::DbError;
use crate::model::cat::CatId;
use crate::model::mission::{MissionId, TargetId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod cat_repo;
pub mod mission_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for agency persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    CatNotFound(CatId),
    MissionNotFound(MissionId),
    TargetNotFound(TargetId),
    /// `UNIQUE (mission_id, name)` rejected a target write.
    DuplicateTargetName { mission: MissionId, name: String },
    /// `UNIQUE (cat_id)` on missions rejected an assignment.
    CatAlreadyAssigned(CatId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CatNotFound(id) => write!(f, "cat not found: {id}"),
            Self::MissionNotFound(id) => write!(f, "mission not found: {id}"),
            Self::TargetNotFound(id) => write!(f, "target not found: {id}"),
            Self::DuplicateTargetName { mission, name } => {
                write!(f, "mission {mission} already has a target named `{name}`")
            }
            Self::CatAlreadyAssigned(id) => write!(f, "cat {id} already has a mission"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
