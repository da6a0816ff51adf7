//! Command: show the state of every dotfile.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, Selection};
use crate::logging::Logger;

use super::CommandSetup;

/// Print the status report of every selected formula.
///
/// # Errors
///
/// Returns an error if setup fails, nothing is selected, or any formula
/// could not be inspected.
pub fn run(global: &GlobalOpts, selection: &Selection, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ids = setup.select(selection, log)?;

    let mut failed = log.failure_count();
    for id in &ids {
        match setup.engine.status(id) {
            Ok(report) => println!("{}\n", report.render()),
            Err(e) => {
                log.error(&format!("{id}: {e}"));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} formula(e) could not be inspected");
    }
    Ok(())
}
