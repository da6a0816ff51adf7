//! Command: list formulae and their metadata.
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, MenuOpts};
use crate::config::manifest::Manifest;
use crate::logging::Logger;

use super::CommandSetup;

/// Print the selected formulae, either as a single line of names
/// (`--simplify`) or one metadata block each.
///
/// # Errors
///
/// Returns an error if setup fails, nothing is selected, or a manifest is
/// invalid.
pub fn run(global: &GlobalOpts, opts: &MenuOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ids = setup.select(&opts.selection, log)?;

    if opts.simplify {
        println!("{}", ids.join(" "));
        return Ok(());
    }

    let mut failed = log.failure_count();
    for id in &ids {
        match setup.engine.load_manifest(id) {
            Ok(manifest) => println!("{}\n", render(id, &manifest)),
            Err(e) => {
                log.error(&e.to_string());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} formula(e) could not be listed");
    }
    Ok(())
}

/// Metadata block for one formula.
#[must_use]
pub fn render(id: &str, manifest: &Manifest) -> String {
    let mut out = String::new();
    let suffix = if manifest.disabled { " (disabled)" } else { "" };
    let _ = write!(out, "▶ {id}{suffix}");
    for (label, value) in manifest.metadata() {
        let _ = write!(out, "\n{label}: {value}");
    }
    out
}
