//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI entry point for the dotfile mount engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotmount",
    about = "Mount formulae of dotfiles into place and unmount them again",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override the repository root (holding formulae/ and backups/)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Answer "yes, always" to every confirmation
    #[arg(short, long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer "no, always" to every confirmation
    #[arg(short, long, global = true)]
    pub no: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List formulae and their metadata
    Menu(MenuOpts),
    /// Mount the dotfiles of formulae
    #[command(visible_alias = "order")]
    Mount(Selection),
    /// Unmount the dotfiles of formulae and restore backups
    #[command(visible_alias = "cancel")]
    Unmount(Selection),
    /// Show the state of every dotfile of formulae
    #[command(visible_alias = "tab")]
    Status(Selection),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Menu(_) => "menu",
            Self::Mount(_) => "mount",
            Self::Unmount(_) => "unmount",
            Self::Status(_) => "status",
            Self::Version => "version",
        }
    }
}

/// Which formulae to operate on.
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
    /// Formulae to manage
    #[arg(value_name = "FORMULA")]
    pub formulae: Vec<String>,

    /// Manage every formula
    #[arg(short, long)]
    pub all: bool,
}

/// Options for the `menu` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct MenuOpts {
    /// Formulae to list.
    #[command(flatten)]
    pub selection: Selection,

    /// Print only the space-separated formula names
    #[arg(short, long)]
    pub simplify: bool,
}
