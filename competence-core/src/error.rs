//! Error types for the competence core
//!
//! Positional store operations and link/unlink never fail loudly; the only
//! hard failures are out-of-range reads and persistence problems.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::list::EntityList`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    /// Positional read outside the list bounds
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while loading or saving a session file
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session file does not exist
    #[error("session file not found: {0:?}")]
    NotFound(PathBuf),

    /// File is locked by another process
    #[error("session file is locked by another user/process: {0:?}")]
    FileLocked(PathBuf),

    /// Other IO error
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for a session document
    #[error("failed to parse session file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The session could not be serialized
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// The file parsed but its contents are inconsistent
    #[error("corrupt session file: {0}")]
    Corrupt(String),

    /// Save was requested before any file path was chosen
    #[error("no file path set for this session")]
    NoPath,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
