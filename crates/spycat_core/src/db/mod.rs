//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection used by the agency store.
//! - Apply schema migrations in deterministic order.
//! - Let repositories verify that a connection is migrated before use.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - `foreign_keys` is enabled, so target cascade and cat detach are enforced
//!   by the store itself.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was handed to a repository before migrations ran.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Rejects connections whose schema is not at the latest migrated version.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let actual_version = migrations::current_user_version(conn)?;
    let expected_version = migrations::latest_version();
    if actual_version != expected_version {
        return Err(DbError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
