//! Domain-specific error types for the mount engine.
//!
//! Internal modules return typed errors so callers can decide, per failure
//! kind, whether to continue with the next dotfile, skip the formula, or stop
//! the whole invocation.  Command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotmountError
//! ├── Validation(ValidationError)  manifest missing, unreadable or malformed
//! ├── Resource(ResourceError)      conflicts and I/O on a single dotfile
//! └── Program(ProgramError)        nothing selected, user abort
//! ```
//!
//! [`ResolutionWarning`] is not an error: it is reported and the offending
//! pattern or file is skipped.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::resources::error::{ConflictError, ResourceError};

/// Top-level error type for the mount engine.
#[derive(Error, Debug)]
pub enum DotmountError {
    /// The formula manifest could not be loaded.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single dotfile could not be converged.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The invocation cannot continue.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

impl DotmountError {
    /// Whether this error must terminate the whole invocation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Program(_))
    }
}

/// Errors raised while loading a formula manifest.
///
/// Fatal to the formula being processed; other formulae continue.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The formula directory does not exist.
    #[error("formula '{0}' is not supported")]
    UnknownFormula(String),

    /// The manifest file is absent.
    #[error("{}: file not found", path.display())]
    Missing {
        /// Expected manifest location.
        path: PathBuf,
    },

    /// The manifest file exists but could not be read.
    #[error("{}: cannot read manifest: {source}", path.display())]
    Unreadable {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid JSON.
    #[error("{}: JSON decode error: {source}", path.display())]
    MalformedJson {
        /// Manifest location.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The manifest is valid JSON but does not follow the schema.
    #[error("{}: format error, {message}", path.display())]
    Schema {
        /// Manifest location.
        path: PathBuf,
        /// What is wrong with the document.
        message: String,
    },
}

/// Non-fatal problems found while enumerating a formula's dotfiles.
///
/// The pattern or file concerned is skipped and enumeration continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// A destination template references an environment variable that is unset.
    #[error("pattern '{pattern}': cannot resolve '{token}', skipping")]
    UnresolvedToken {
        /// Glob pattern whose destination could not be resolved.
        pattern: String,
        /// The first token that failed to resolve.
        token: String,
    },

    /// The glob pattern itself is not valid.
    #[error("pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        message: String,
    },

    /// A matched entry could not be inspected.
    #[error("{}: {message}", path.display())]
    Unreadable {
        /// Entry that could not be read.
        path: PathBuf,
        /// Reason.
        message: String,
    },

    /// A matched source is itself a symlink.
    #[error("{}: source is a symlink, only regular files can be mounted", path.display())]
    SymlinkedSource {
        /// The symlinked entry.
        path: PathBuf,
    },

    /// The same canonical source was matched by an earlier pattern.
    #[error("{}: already matched by another pattern", path.display())]
    DuplicateSource {
        /// Canonical path of the duplicate.
        path: PathBuf,
    },

    /// The source resolves outside of the formula directory.
    #[error("{}: resolves outside of the formula directory", path.display())]
    EscapesRoot {
        /// Canonical path of the escaping entry.
        path: PathBuf,
    },
}

/// Errors that terminate the whole invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// Neither formula names nor `--all` were given, or none were valid.
    #[error("please choose at least one formula to manage")]
    NoFormulaSelected,

    /// The user aborted a confirmation prompt.
    #[error("aborted by user")]
    Aborted,

    /// The user interrupted the run.
    #[error("interrupted")]
    Interrupted,
}
