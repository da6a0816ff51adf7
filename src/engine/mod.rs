//! Mount, unmount and status of whole formulae.
//!
//! The engine ties the pieces together: it loads a [`Formula`], prepares
//! its [`BackupDir`], streams its [`Dotfiles`](crate::formula::Dotfiles) and
//! converges each mapping independently.  A conflict or I/O failure on one
//! mapping is logged and recorded; the next mapping is still processed.
pub mod report;
pub mod status;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Layout;
use crate::config::manifest::Manifest;
use crate::config::template::Environment;
use crate::error::{DotmountError, ResourceError, ValidationError};
use crate::formula::Formula;
use crate::logging::Log;
use crate::prompt::Session;
use crate::resources::backup::{self, BackupDir};
use crate::resources::dotfile::{DotfileResource, link_state};
use crate::resources::{Resource, ResourceChange};

pub use report::{FormulaReport, MappingOutcome, Outcome};
pub use status::{DotfileStatus, StatusReport};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Mount,
    Unmount,
}

impl Direction {
    const fn verb(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Unmount => "unmount",
        }
    }
}

/// Entry point for operations on formulae.
pub struct Engine {
    layout: Layout,
    env: Box<dyn Environment>,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("layout", &self.layout)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over `layout`, resolving destinations in `env`.
    #[must_use]
    pub fn new(layout: Layout, env: Box<dyn Environment>, log: Arc<dyn Log>) -> Self {
        Self { layout, env, log }
    }

    /// The directory layout this engine works on.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Names of all formulae, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the formulae root cannot be read.
    pub fn list_formulae(&self) -> Result<Vec<String>> {
        self.layout.list_formulae()
    }

    /// Load and validate the manifest of formula `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the formula does not exist or its
    /// manifest is invalid.
    pub fn load_manifest(&self, id: &str) -> Result<Manifest, ValidationError> {
        Formula::load(id, &self.layout).map(|f| f.manifest)
    }

    /// Mount every dotfile of formula `id`.
    ///
    /// The backup directory is prepared first, so stale backups are purged
    /// (or kept, if the user declines) before anything is displaced.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid formula, a
    /// [`ProgramError`](crate::error::ProgramError) on abort or interrupt,
    /// or a [`ResourceError`] if the backup directory cannot be prepared.
    /// Per-mapping problems are reported in the [`FormulaReport`] instead.
    pub fn mount(&self, id: &str, session: &mut Session) -> Result<FormulaReport, DotmountError> {
        session.check_interrupt()?;
        let formula = Formula::load(id, &self.layout)?;
        if formula.manifest.disabled {
            self.log.warn(&format!("{id}: formula is disabled, skipping"));
            return Ok(FormulaReport::disabled(id));
        }

        self.log.debug(&format!("{id}: mount start"));
        BackupDir::new(&formula.backup_dir).prepare(session, &*self.log)?;
        let report = self.converge(&formula, session, Direction::Mount)?;
        self.log.debug(&format!("{id}: mount done"));
        Ok(report)
    }

    /// Unmount every dotfile of formula `id`, restoring backups.
    ///
    /// The backup directory is prepared afterwards, so anything left behind
    /// is offered for purging.
    ///
    /// # Errors
    ///
    /// Same as [`mount`](Self::mount).
    pub fn unmount(&self, id: &str, session: &mut Session) -> Result<FormulaReport, DotmountError> {
        session.check_interrupt()?;
        let formula = Formula::load(id, &self.layout)?;
        if formula.manifest.disabled {
            self.log.warn(&format!("{id}: formula is disabled, skipping"));
            return Ok(FormulaReport::disabled(id));
        }

        self.log.debug(&format!("{id}: unmount start"));
        let report = self.converge(&formula, session, Direction::Unmount)?;
        BackupDir::new(&formula.backup_dir).prepare(session, &*self.log)?;
        self.log.debug(&format!("{id}: unmount done"));
        Ok(report)
    }

    /// Inspect every dotfile of formula `id` without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid formula, or a
    /// [`ResourceError`] if a location cannot be inspected.
    pub fn status(&self, id: &str) -> Result<StatusReport, DotmountError> {
        let formula = Formula::load(id, &self.layout)?;
        let mut dotfiles = formula.dotfiles(&*self.env, &*self.log);
        let mut statuses = Vec::new();
        for mapping in dotfiles.by_ref() {
            statuses.push(DotfileStatus {
                target: link_state(&mapping.source, &mapping.target)?,
                backup: backup::state(&mapping.backup)?,
                mapping,
            });
        }
        Ok(StatusReport {
            id: formula.id.clone(),
            disabled: formula.manifest.disabled,
            warnings: dotfiles.warnings().to_vec(),
            dotfiles: statuses,
        })
    }

    fn converge(
        &self,
        formula: &Formula,
        session: &Session,
        direction: Direction,
    ) -> Result<FormulaReport, DotmountError> {
        let mut report = FormulaReport::new(&formula.id);
        let mut dotfiles = formula.dotfiles(&*self.env, &*self.log);

        for mapping in dotfiles.by_ref() {
            session.check_interrupt()?;
            let resource = DotfileResource::new(&mapping, &*self.log);
            let result = match direction {
                Direction::Mount => resource.apply(),
                Direction::Unmount => resource.remove(),
            };
            let outcome = self.outcome(&formula.id, &resource, direction, result);
            report.outcomes.push(MappingOutcome { mapping, outcome });
        }

        report.warnings = dotfiles.warnings().to_vec();
        Ok(report)
    }

    fn outcome(
        &self,
        id: &str,
        resource: &DotfileResource<'_>,
        direction: Direction,
        result: std::result::Result<ResourceChange, ResourceError>,
    ) -> Outcome {
        match result {
            Ok(change) => {
                match &change {
                    ResourceChange::Skipped { reason } => {
                        self.log.warn(&format!("{id}: {reason}"));
                    }
                    c if c.changed() => {
                        self.log
                            .info(&format!("{id}: {} {}", direction.verb(), resource.description()));
                    }
                    _ => {}
                }
                Outcome::Done(change)
            }
            Err(ResourceError::Conflict(conflict)) => {
                self.log.error(&format!("{id}: {conflict}"));
                Outcome::Conflict(conflict)
            }
            Err(e) => {
                self.log.error(&format!("{id}: {e}"));
                Outcome::Failed(e.to_string())
            }
        }
    }
}
