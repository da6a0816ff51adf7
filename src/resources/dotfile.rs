//! Dotfile resource: one source file linked into place.
use std::path::Path;

use super::backup;
use super::error::{ConflictError, ResourceError};
use super::helpers::fs::{EntryKind, ensure_parent_dir, entry_kind};
use super::symlink::{create_symlink, remove_symlink};
use super::{LinkState, Resource, ResourceChange};
use crate::formula::DotfileMapping;
use crate::logging::Log;

/// Classify `target` relative to `source` (which must be canonical).
///
/// # Errors
///
/// Returns an error if the target cannot be inspected.
pub fn link_state(source: &Path, target: &Path) -> Result<LinkState, ResourceError> {
    let kind = entry_kind(target)?;
    Ok(match kind {
        EntryKind::Absent => LinkState::Absent,
        EntryKind::Other => LinkState::Unknown,
        EntryKind::Symlink | EntryKind::File => {
            if resolves_to(target, source) {
                LinkState::Mounted
            } else {
                LinkState::NotMounted
            }
        }
    })
}

/// Whether `path` canonicalizes to `source`.
fn resolves_to(path: &Path, source: &Path) -> bool {
    dunce::canonicalize(path).is_ok_and(|resolved| resolved == source)
}

/// A [`DotfileMapping`] with the means to report what happens to it.
#[derive(Clone, Copy)]
pub struct DotfileResource<'a> {
    mapping: &'a DotfileMapping,
    log: &'a dyn Log,
}

impl std::fmt::Debug for DotfileResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DotfileResource")
            .field("mapping", self.mapping)
            .finish_non_exhaustive()
    }
}

impl<'a> DotfileResource<'a> {
    /// Create a resource for `mapping`.
    #[must_use]
    pub const fn new(mapping: &'a DotfileMapping, log: &'a dyn Log) -> Self {
        Self { mapping, log }
    }

    fn name(&self) -> String {
        self.mapping.source.file_name().map_or_else(
            || self.mapping.source.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    /// Link `target -> source`, undoing the backup if linking fails.
    fn link(&self, backed_up: bool) -> Result<ResourceChange, ResourceError> {
        let DotfileMapping {
            source,
            target,
            backup,
        } = self.mapping;
        if let Err(e) = create_symlink(source, target) {
            if backed_up && let Err(undo) = backup::restore(target, backup, self.log) {
                self.log
                    .error(&format!("{}: could not put back backup: {undo}", self.name()));
            }
            return Err(e);
        }
        Ok(ResourceChange::Applied { backed_up })
    }
}

impl Resource for DotfileResource<'_> {
    fn description(&self) -> String {
        format!(
            "{} -> {}",
            self.mapping.target.display(),
            self.mapping.source.display()
        )
    }

    fn current_state(&self) -> Result<LinkState, ResourceError> {
        link_state(&self.mapping.source, &self.mapping.target)
    }

    fn apply(&self) -> Result<ResourceChange, ResourceError> {
        let DotfileMapping { target, backup, .. } = self.mapping;
        match self.current_state()? {
            LinkState::Mounted => {
                self.log.debug(&format!("{}: already mounted", self.name()));
                Ok(ResourceChange::AlreadyCorrect)
            }
            LinkState::Unknown => Err(ConflictError::UnknownTarget {
                path: target.clone(),
            }
            .into()),
            LinkState::Absent => {
                self.log.info(&format!(
                    "{}: {} does not exist yet, creating it",
                    self.name(),
                    target.display()
                ));
                ensure_parent_dir(target)?;
                self.link(false)
            }
            LinkState::NotMounted => {
                self.log.debug(&format!(
                    "{}: backing up {} to {}",
                    self.name(),
                    target.display(),
                    backup.display()
                ));
                backup::store(target, backup, self.log)?;
                self.link(true)
            }
        }
    }

    fn remove(&self) -> Result<ResourceChange, ResourceError> {
        let DotfileMapping {
            source,
            target,
            backup,
        } = self.mapping;
        if !resolves_to(target, source) {
            self.log.debug(&format!("{}: not mounted", self.name()));
            return Ok(ResourceChange::AlreadyCorrect);
        }
        if entry_kind(target)? != EntryKind::Symlink {
            return Ok(ResourceChange::Skipped {
                reason: format!("{} is the source itself, not a link", target.display()),
            });
        }

        remove_symlink(target)?;
        let restored = backup::restore(target, backup, self.log)?;
        Ok(ResourceChange::Removed { restored })
    }
}
