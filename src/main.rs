//! Command-line entry point for dotmount.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;

use dotmount::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(logging::Logger::new(args.command.name()));

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupt);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            log.debug(&format!("cannot install Ctrl-C handler: {e}"));
        }
    }

    match &args.command {
        cli::Command::Menu(opts) => commands::menu::run(&args.global, opts, &log),
        cli::Command::Mount(sel) => commands::mount::run(&args.global, sel, &log, interrupt),
        cli::Command::Unmount(sel) => commands::unmount::run(&args.global, sel, &log, interrupt),
        cli::Command::Status(sel) => commands::status::run(&args.global, sel, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
