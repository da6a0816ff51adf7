//! Typed error variants for dotfile resource operations.
//!
//! A [`ResourceError`] concerns exactly one dotfile: the engine logs it and
//! moves on to the next mapping.

use std::path::PathBuf;

use thiserror::Error;

/// A location is occupied by something the engine refuses to touch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// The target exists but is neither a regular file nor a symlink.
    #[error("{}: unknown existing target, not a file or symlink", path.display())]
    UnknownTarget {
        /// The conflicting target.
        path: PathBuf,
    },

    /// The backup slot exists but is neither a regular file nor a symlink.
    #[error("{}: unknown existing backup, not a file or symlink", path.display())]
    UnknownBackup {
        /// The conflicting backup slot.
        path: PathBuf,
    },

    /// The backup slot already holds an earlier backup.
    #[error("{}: backup already exists, refusing to overwrite", path.display())]
    BackupOccupied {
        /// The occupied backup slot.
        path: PathBuf,
    },
}

/// Errors that arise while converging a single dotfile.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The target or backup location is in a state the engine will not modify.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// A filesystem call failed.
    #[error("{operation} {}: {source}", path.display())]
    Io {
        /// What was being attempted (e.g. `"create link"`).
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ResourceError {
    /// Build an [`ResourceError::Io`] from an operation label and path.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            operation,
            path,
            source,
        }
    }

    /// Whether this error is a conflict rather than an I/O failure.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
