//! Read-only status of a formula's dotfiles.
use std::fmt::Write as _;

use crate::error::ResolutionWarning;
use crate::formula::DotfileMapping;
use crate::resources::LinkState;
use crate::resources::backup::BackupState;

/// Label of the source side; any enumerated source can be mounted.
pub const SOURCE_SUPPORTED: &str = "supported";

/// State of one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfileStatus {
    /// The mapping inspected.
    pub mapping: DotfileMapping,
    /// State of the target location.
    pub target: LinkState,
    /// State of the backup slot.
    pub backup: BackupState,
}

/// State of every mapping of one formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Formula identifier.
    pub id: String,
    /// Whether the formula is disabled.
    pub disabled: bool,
    /// Mappings in enumeration order.
    pub dotfiles: Vec<DotfileStatus>,
    /// Patterns and files skipped during enumeration.
    pub warnings: Vec<ResolutionWarning>,
}

impl StatusReport {
    /// Render the report as plain text, one block per dotfile.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let suffix = if self.disabled { " (disabled)" } else { "" };
        let _ = writeln!(out, "▶ {}{suffix}", self.id);
        for status in &self.dotfiles {
            let DotfileMapping {
                source,
                target,
                backup,
            } = &status.mapping;
            let name = source
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
            let _ = writeln!(out);
            let _ = writeln!(out, "@ dotfile: {name}");
            let _ = writeln!(out, "# source: {}", source.display());
            let _ = writeln!(out, "# status: {SOURCE_SUPPORTED}");
            let _ = writeln!(out, "$ target: {}", target.display());
            let _ = writeln!(out, "$ status: {}", status.target.label());
            let _ = writeln!(out, "% backup: {}", backup.display());
            let _ = writeln!(out, "% status: {}", status.backup.label());
        }
        out.truncate(out.trim_end().len());
        out
    }
}
