//! Platform symlink primitives.
use std::path::{Path, PathBuf};

use super::error::ResourceError;

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created (on Windows this usually
/// means Developer Mode is off and the process is not elevated).
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), ResourceError> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(ResourceError::io("create link", link))
}

/// Remove a symlink (or plain file), treating "already gone" as success.
///
/// On Windows, directory symlinks must be removed with `remove_dir`;
/// `symlink_metadata().is_dir()` is `false` for them, so the raw
/// `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<(), ResourceError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ResourceError::io("inspect", path)(e)),
    };
    let result = if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            Err(ResourceError::io("remove link", path)(e))
        }
        _ => Ok(()),
    }
}

/// Where the symlink at `link` ultimately points.
///
/// Follows the whole chain when it resolves; a dangling link yields its raw
/// destination, made absolute against the link's directory.
///
/// # Errors
///
/// Returns an error if `link` is not a readable symlink.
pub fn resolved_destination(link: &Path) -> Result<PathBuf, ResourceError> {
    if let Ok(resolved) = dunce::canonicalize(link) {
        return Ok(resolved);
    }
    let raw = std::fs::read_link(link).map_err(ResourceError::io("read link", link))?;
    Ok(match link.parent() {
        Some(parent) if raw.is_relative() => parent.join(raw),
        _ => raw,
    })
}

/// Check if metadata represents a directory-like entry.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
