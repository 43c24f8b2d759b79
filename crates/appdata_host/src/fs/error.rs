//! Error taxonomy shared by every host filesystem adapter.

use std::fmt::Display;
use std::io;

use thiserror::Error;

use super::path::AppDataPath;

/// Convenience result type for host filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure surfaced by a host filesystem call or a facade precondition.
pub enum FsError {
    /// The addressed entry (or its parent directory) does not exist.
    #[error("not found: `{0}`")]
    NotFound(String),
    /// The destination of a create or rename is already occupied.
    #[error("already exists: `{0}`")]
    AlreadyExists(String),
    /// A required field was empty or a name/path was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Permission, device, or capacity failure reported by the host.
    #[error("i/o failure at `{path}`: {message}")]
    Io {
        /// Rendered app-data path the failure relates to.
        path: String,
        /// Host-provided failure description.
        message: String,
    },
}

impl FsError {
    /// Builds a [`FsError::NotFound`] for `path`.
    pub fn not_found(path: &AppDataPath) -> Self {
        Self::NotFound(path.to_string())
    }

    /// Builds a [`FsError::AlreadyExists`] for `path`.
    pub fn already_exists(path: &AppDataPath) -> Self {
        Self::AlreadyExists(path.to_string())
    }

    /// Builds a [`FsError::InvalidInput`] with `message`.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Builds a [`FsError::Io`] for `path`.
    pub fn io(path: impl Display, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Maps a native I/O error onto the taxonomy, keeping `NotFound`/`AlreadyExists` distinct.
    pub fn from_io(path: &AppDataPath, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::not_found(path),
            io::ErrorKind::AlreadyExists => Self::already_exists(path),
            _ => Self::io(path, err.to_string()),
        }
    }

    /// Returns `true` for [`FsError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
