//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the query facade is written against.
//! - Isolate SQLite query details from engine/facade orchestration.
//!
//! # Invariants
//! - Write paths surface referential problems as semantic errors
//!   (`DuplicateId`, `MissingReference`) before any row is inserted.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod matrix_repo;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence and referential-integrity error for matrix storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A write attempted to reuse an existing primary identifier.
    DuplicateId { entity: &'static str, id: String },
    /// A write referenced a job level or criterion that does not exist.
    MissingReference { entity: &'static str, id: String },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateId { entity, id } => {
                write!(f, "{entity} with id `{id}` already exists")
            }
            Self::MissingReference { entity, id } => {
                write!(f, "{entity} with id `{id}` does not exist")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted matrix data: {message}"),
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
