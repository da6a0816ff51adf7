//! Per-formula backup directory.
//!
//! Holds whatever occupied each target before it was mounted, so unmounting
//! can put it back.  Each [`store`] and [`restore`] moves one entry with a
//! single rename (regular files) or link-then-unlink (symlinks).
use std::path::{Path, PathBuf};

use super::error::{ConflictError, ResourceError};
use super::helpers::fs::{EntryKind, ensure_parent_dir, entry_kind, move_entry, remove_entry};
use super::symlink::{create_symlink, remove_symlink, resolved_destination};
use crate::error::DotmountError;
use crate::logging::Log;
use crate::prompt::{Question, Session};

/// Observed state of a backup slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    /// A file or symlink is kept.
    BackedUp,
    /// Something other than a file or symlink occupies the slot.
    Unknown,
    /// Nothing is kept.
    Absent,
}

impl BackupState {
    /// Label used in status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BackedUp => "backed-up",
            Self::Unknown => "unknown-file",
            Self::Absent => "not-exists",
        }
    }
}

/// Result of [`BackupDir::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    /// The directory was already empty.
    Empty,
    /// This many entries were deleted.
    Purged(usize),
    /// This many entries were kept at the user's request.
    Kept(usize),
}

/// The backup directory of one formula.
#[derive(Debug, Clone)]
pub struct BackupDir {
    dir: PathBuf,
}

impl BackupDir {
    /// Wrap `dir`; nothing is created until [`prepare`](Self::prepare).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Make sure the directory exists and, with the user's consent, is empty.
    ///
    /// A non-empty directory triggers [`Question::PurgeBackups`].  When the
    /// purge is declined the existing entries stay and later [`store`] calls
    /// refuse to overwrite them.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Aborted`](crate::error::ProgramError::Aborted)
    /// if the user aborts, or a resource error if the directory cannot be
    /// created, listed or cleared.
    pub fn prepare(&self, session: &mut Session, log: &dyn Log) -> Result<Prepared, DotmountError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(ResourceError::io("create backup directory", &self.dir))?;

        let entries = self.entries()?;
        if entries.is_empty() {
            return Ok(Prepared::Empty);
        }

        let prompt = format!(
            "{} holds {} backup(s), delete them?",
            self.dir.display(),
            entries.len()
        );
        if !session.ask(Question::PurgeBackups, &prompt)? {
            log.warn(&format!(
                "{}: keeping {} existing backup(s)",
                self.dir.display(),
                entries.len()
            ));
            return Ok(Prepared::Kept(entries.len()));
        }

        for entry in &entries {
            remove_entry(entry)?;
            log.debug(&format!("purged {}", entry.display()));
        }
        log.info(&format!(
            "{}: purged {} backup(s)",
            self.dir.display(),
            entries.len()
        ));
        Ok(Prepared::Purged(entries.len()))
    }

    fn entries(&self) -> Result<Vec<PathBuf>, ResourceError> {
        let read = std::fs::read_dir(&self.dir).map_err(ResourceError::io("list", &self.dir))?;
        let mut entries = Vec::new();
        for entry in read {
            entries.push(entry.map_err(ResourceError::io("list", &self.dir))?.path());
        }
        entries.sort();
        Ok(entries)
    }
}

/// Classify the backup slot at `backup`.
///
/// # Errors
///
/// Returns an error if the slot cannot be inspected.
pub fn state(backup: &Path) -> Result<BackupState, ResourceError> {
    Ok(match entry_kind(backup)? {
        EntryKind::Absent => BackupState::Absent,
        EntryKind::File | EntryKind::Symlink => BackupState::BackedUp,
        EntryKind::Other => BackupState::Unknown,
    })
}

/// Move whatever occupies `target` into the slot `backup`.
///
/// A symlink is recreated in the slot pointing at its resolved destination
/// and then unlinked; a regular file is renamed.
///
/// # Errors
///
/// Returns a [`ConflictError`] without touching anything if the slot is
/// occupied or the target is neither a file nor a symlink.
pub fn store(target: &Path, backup: &Path, log: &dyn Log) -> Result<(), ResourceError> {
    match state(backup)? {
        BackupState::Absent => {}
        BackupState::BackedUp => {
            return Err(ConflictError::BackupOccupied {
                path: backup.to_path_buf(),
            }
            .into());
        }
        BackupState::Unknown => {
            return Err(ConflictError::UnknownBackup {
                path: backup.to_path_buf(),
            }
            .into());
        }
    }

    match entry_kind(target)? {
        EntryKind::Symlink => {
            let destination = resolved_destination(target)?;
            ensure_parent_dir(backup)?;
            create_symlink(&destination, backup)?;
            if let Err(e) = remove_symlink(target) {
                undo_link(backup, log);
                return Err(e);
            }
            Ok(())
        }
        EntryKind::File => {
            ensure_parent_dir(backup)?;
            move_entry(target, backup)
        }
        EntryKind::Other => Err(ConflictError::UnknownTarget {
            path: target.to_path_buf(),
        }
        .into()),
        EntryKind::Absent => Ok(()),
    }
}

/// Put the entry kept in `backup` back at `target`.
///
/// Returns `false` (after logging a warning) when there is nothing to restore.
///
/// # Errors
///
/// Returns a [`ConflictError`] without touching anything if the slot holds
/// something other than a file or symlink, or if `target` is occupied.
pub fn restore(target: &Path, backup: &Path, log: &dyn Log) -> Result<bool, ResourceError> {
    let kind = entry_kind(backup)?;
    if kind == EntryKind::Absent {
        log.warn(&format!("{}: no backup to restore", backup.display()));
        return Ok(false);
    }
    if kind == EntryKind::Other {
        return Err(ConflictError::UnknownBackup {
            path: backup.to_path_buf(),
        }
        .into());
    }
    if entry_kind(target)? != EntryKind::Absent {
        return Err(ConflictError::UnknownTarget {
            path: target.to_path_buf(),
        }
        .into());
    }

    ensure_parent_dir(target)?;
    if kind == EntryKind::Symlink {
        let destination = resolved_destination(backup)?;
        create_symlink(&destination, target)?;
        if let Err(e) = remove_symlink(backup) {
            undo_link(target, log);
            return Err(e);
        }
    } else {
        move_entry(backup, target)?;
    }
    Ok(true)
}

/// Remove a half-made copy of a link; a leftover would occupy the slot.
fn undo_link(link: &Path, log: &dyn Log) {
    if let Err(e) = remove_symlink(link) {
        log.error(&format!(
            "{}: could not remove partial copy, remove it by hand: {e}",
            link.display()
        ));
    }
}
