//! Command: mount formulae.
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;

use crate::cli::{GlobalOpts, Selection};
use crate::logging::Logger;

use super::CommandSetup;

/// Mount every selected formula.
///
/// # Errors
///
/// Returns an error if setup fails, nothing is selected, the user aborts,
/// or any formula failed validation.
pub fn run(
    global: &GlobalOpts,
    selection: &Selection,
    log: &Arc<Logger>,
    interrupt: Arc<AtomicBool>,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ids = setup.select(selection, log)?;
    let mut session = super::session(global, interrupt);

    super::run_formulae(&ids, log, |id| setup.engine.mount(id, &mut session))
}
