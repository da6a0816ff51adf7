//! Formula-based dotfile mount engine.
//!
//! A *formula* is a directory of configuration files plus a
//! `formula-info.json` manifest mapping glob patterns to destination
//! directories.  Mounting a formula replaces every destination file with a
//! symlink into the formula, moving whatever was there into a per-formula
//! backup directory; unmounting puts the backups back.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: repository layout, manifests and path templates
//! - **[`formula`]**: enumerate the dotfiles a formula manages
//! - **[`resources`]**: idempotent `check + apply` primitives (links, backups)
//! - **[`engine`]**: mount, unmount and status of whole formulae
//! - **[`commands`]**: top-level subcommand orchestration (`mount`, `unmount`, `status`, `menu`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod formula;
pub mod logging;
pub mod prompt;
pub mod resources;
