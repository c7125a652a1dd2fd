use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or saving the node list.
#[derive(Debug, Error)]
pub enum PersistError {
    /// No snapshot exists yet. Callers treat this as an empty set.
    #[error("snapshot file {0} does not exist")]
    NotFound(PathBuf),

    #[error("wrong snapshot header: expected {expected:?}, found {found:?}")]
    Format {
        expected: String,
        found: Option<String>,
    },

    #[error("unsupported snapshot version: expected {expected:?}, found {found:?}")]
    VersionMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("snapshot i/o failed: {0}")]
    Io(#[from] io::Error),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::NotFound(_))
    }
}
