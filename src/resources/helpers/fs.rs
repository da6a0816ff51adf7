//! File-system helpers shared by the dotfile resources.
use std::io;
use std::path::Path;

use crate::resources::error::ResourceError;

/// What occupies a path, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Nothing (not even a broken symlink).
    Absent,
    /// A symlink, possibly dangling.
    Symlink,
    /// A regular file.
    File,
    /// A directory or special file.
    Other,
}

/// Classify `path` without following symlinks.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read for a reason other than
/// the path not existing.
pub fn entry_kind(path: &Path) -> Result<EntryKind, ResourceError> {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_symlink() => Ok(EntryKind::Symlink),
        Ok(meta) if meta.is_file() => Ok(EntryKind::File),
        Ok(_) => Ok(EntryKind::Other),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Absent),
        Err(e) => Err(ResourceError::io("inspect", path)(e)),
    }
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ResourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ResourceError::io("create parent", parent))?;
    }
    Ok(())
}

/// Move `from` to `to` with a single rename.
///
/// No copy fallback: a rename across file systems fails instead of leaving a
/// half-moved file behind.
///
/// # Errors
///
/// Returns an error if the rename fails.
pub fn move_entry(from: &Path, to: &Path) -> Result<(), ResourceError> {
    std::fs::rename(from, to).map_err(ResourceError::io("move", from))
}

/// Remove one directory entry: files and symlinks are unlinked, real
/// directories are removed recursively.
///
/// # Errors
///
/// Returns an error if the entry cannot be removed.
pub fn remove_entry(path: &Path) -> Result<(), ResourceError> {
    match entry_kind(path)? {
        EntryKind::Absent => Ok(()),
        EntryKind::Other if path.is_dir() => {
            std::fs::remove_dir_all(path).map_err(ResourceError::io("remove", path))
        }
        _ => crate::resources::symlink::remove_symlink(path),
    }
}
