//! Repository layout, settings and per-formula manifests.
pub mod manifest;
pub mod template;
pub mod toml_loader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings file at the repository root.
pub const SETTINGS_FILE: &str = "dotmount.toml";

/// Contents of [`SETTINGS_FILE`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding one subdirectory per formula, relative to the root.
    pub formulae_dir: PathBuf,
    /// Directory holding one backup subdirectory per formula, relative to the root.
    pub backups_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            formulae_dir: PathBuf::from("formulae"),
            backups_dir: PathBuf::from("backups"),
        }
    }
}

/// Where formulae and their backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Formulae source root.
    pub formulae: PathBuf,
    /// Backups root.
    pub backups: PathBuf,
}

impl Layout {
    /// Create a layout from explicit directories.
    #[must_use]
    pub fn new(formulae: impl Into<PathBuf>, backups: impl Into<PathBuf>) -> Self {
        Self {
            formulae: formulae.into(),
            backups: backups.into(),
        }
    }

    /// Load the layout of the repository at `root`, honouring [`SETTINGS_FILE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let settings: Settings = toml_loader::load_config(&root.join(SETTINGS_FILE))
            .with_context(|| format!("loading {SETTINGS_FILE}"))?;
        Ok(Self::new(
            root.join(settings.formulae_dir),
            root.join(settings.backups_dir),
        ))
    }

    /// Source directory of formula `id`.
    #[must_use]
    pub fn formula_dir(&self, id: &str) -> PathBuf {
        self.formulae.join(id)
    }

    /// Backup directory of formula `id`.
    #[must_use]
    pub fn backup_dir(&self, id: &str) -> PathBuf {
        self.backups.join(id)
    }

    /// Names of all formulae (subdirectories of the formulae root), sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the formulae root cannot be read.
    pub fn list_formulae(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.formulae)
            .with_context(|| format!("reading formulae directory {}", self.formulae.display()))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("reading entry in {}", self.formulae.display()))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
