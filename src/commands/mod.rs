//! Top-level subcommand orchestration.
pub mod menu;
pub mod mount;
pub mod status;
pub mod unmount;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, Selection};
use crate::config::Layout;
use crate::config::template::ProcessEnv;
use crate::engine::{Engine, FormulaReport};
use crate::error::{DotmountError, ProgramError};
use crate::logging::{FormulaStatus, Log, Logger};
use crate::prompt::{Decision, FixedAnswer, Prompt, Session};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DOTMOUNT_ROOT";

/// Resolve the repository root directory.
///
/// Checks, in order: `--root`, `$DOTMOUNT_ROOT`, the directories around the
/// running binary, and the current directory.
///
/// # Errors
///
/// Returns an error if no candidate holds a formulae directory.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join("../.."), // target/release/ -> repo root
            parent.join(".."),    // bin/ -> repo root
        ];
        for candidate in &candidates {
            if is_repo_root(candidate) {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    if is_repo_root(&cwd) {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine dotmount root. Use --root or set {ROOT_ENV} env var");
}

/// A root either has the default formulae directory or a settings file.
fn is_repo_root(dir: &std::path::Path) -> bool {
    dir.join(crate::config::SETTINGS_FILE).is_file() || dir.join("formulae").is_dir()
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Repository root.
    pub root: PathBuf,
    /// Engine over the root's layout.
    pub engine: Engine,
}

impl CommandSetup {
    /// Resolve the root, load the layout, and build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined or the settings
    /// file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));

        let layout = Layout::load(&root)?;
        log.debug(&format!("formulae: {}", layout.formulae.display()));
        log.debug(&format!("backups: {}", layout.backups.display()));

        let engine = Engine::new(
            layout,
            Box::new(ProcessEnv),
            Arc::clone(log) as Arc<dyn Log>,
        );
        Ok(Self { root, engine })
    }

    /// Turn a selection into formula identifiers.
    ///
    /// `--all` yields every formula.  Unknown names are reported, recorded as
    /// failed and dropped; duplicates are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NoFormulaSelected`] if nothing is left, or an
    /// error if the formulae directory cannot be listed.
    pub fn select(&self, selection: &Selection, log: &Logger) -> Result<Vec<String>> {
        let mut selected: Vec<String> = Vec::new();
        if selection.all {
            selected = self.engine.list_formulae()?;
        }
        for name in &selection.formulae {
            if selected.contains(name) {
                continue;
            }
            if self.engine.layout().formula_dir(name).is_dir() {
                selected.push(name.clone());
            } else {
                log.warn(&format!("{name}: formula is not supported"));
                log.record(name, FormulaStatus::Failed, Some("not supported"));
            }
        }

        if selected.is_empty() {
            return Err(ProgramError::NoFormulaSelected.into());
        }
        Ok(selected)
    }
}

/// Build the confirmation session for `global`.
#[must_use]
pub fn session(global: &GlobalOpts, interrupt: Arc<AtomicBool>) -> Session {
    let session = if global.yes {
        Session::new(Box::new(FixedAnswer(Decision::YesAlways)))
    } else if global.no {
        Session::new(Box::new(FixedAnswer(Decision::NoAlways)))
    } else {
        Session::new(Box::new(Prompt::stdio().with_interrupt(Arc::clone(&interrupt))))
    };
    session.with_interrupt(interrupt)
}

/// Run `op` on every formula, print the summary, and bail if any failed.
///
/// Validation and resource errors are recorded against the formula and the
/// run continues; program errors (abort, interrupt) stop it immediately.
///
/// # Errors
///
/// Returns the first program error, or an error if one or more formulae
/// failed.
pub fn run_formulae<F>(ids: &[String], log: &Logger, mut op: F) -> Result<()>
where
    F: FnMut(&str) -> std::result::Result<FormulaReport, DotmountError>,
{
    for id in ids {
        log.stage(id);
        match op(id) {
            Ok(report) => log.record(id, report.status(), Some(&report.summary())),
            Err(e) if e.is_fatal() => {
                log.print_summary();
                return Err(e).with_context(|| format!("while processing {id}"));
            }
            Err(e) => {
                log.error(&format!("{id}: {e}"));
                log.record(id, FormulaStatus::Failed, Some(&e.to_string()));
            }
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} formula(e) failed");
    }
    Ok(())
}
