//! Idempotent dotfile primitives (check + apply pattern).
pub mod backup;
pub mod dotfile;
pub mod error;
pub mod symlink;

/// Shared file-system helpers.
pub mod helpers {
    pub mod fs;
}

use error::ResourceError;

/// Observed state of a mount target.
///
/// # Examples
///
/// ```
/// use dotmount::resources::LinkState;
///
/// assert_eq!(LinkState::Mounted.label(), "mounted");
/// assert_eq!(LinkState::Absent.label(), "not-exists");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The target resolves to the source.
    Mounted,
    /// A file or symlink that resolves elsewhere occupies the target.
    NotMounted,
    /// Something other than a file or symlink occupies the target.
    Unknown,
    /// Nothing is at the target.
    Absent,
}

impl LinkState {
    /// Label used in status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::NotMounted => "not-mounted",
            Self::Unknown => "unknown-file",
            Self::Absent => "not-exists",
        }
    }
}

/// Result of applying or removing a resource.
///
/// # Examples
///
/// ```
/// use dotmount::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied { backed_up: false };
/// assert!(applied.changed());
/// assert!(!ResourceChange::AlreadyCorrect.changed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The link was created; `backed_up` tells whether something was displaced.
    Applied {
        /// A previous entry was moved into the backup directory.
        backed_up: bool,
    },
    /// The link was removed; `restored` tells whether a backup was put back.
    Removed {
        /// A backup was moved back into place.
        restored: bool,
    },
    /// Nothing to do.
    AlreadyCorrect,
    /// Left alone for the given reason.
    Skipped {
        /// Why nothing was done.
        reason: String,
    },
}

impl ResourceChange {
    /// Whether the file system was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::Removed { .. })
    }
}

/// A resource that can be checked, applied and removed.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<LinkState, ResourceError>;

    /// Bring the resource into place.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the location holds something that must not be
    /// touched, or an I/O error.
    fn apply(&self) -> Result<ResourceChange, ResourceError>;

    /// Undo a previous [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Returns a conflict if the previous contents cannot be put back, or an
    /// I/O error.
    fn remove(&self) -> Result<ResourceChange, ResourceError>;
}
