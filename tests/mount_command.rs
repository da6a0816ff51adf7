#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for mounting formulae.
mod common;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::*;
use dotmount::engine::Outcome;
use dotmount::error::{ConflictError, DotmountError, ProgramError, ValidationError};
use dotmount::logging::FormulaStatus;
use dotmount::prompt::{Decision, Session};
use dotmount::resources::ResourceChange;

const VIM_MANIFEST: &str = r#"{ "name": "vim", "path": { "vimrc": ["$HOME"] } }"#;

#[test]
fn mount_links_and_backs_up_existing_file() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .home_file("vimrc", "old config\n")
        .build();

    let report = repo
        .engine()
        .mount("vim", &mut session(Decision::YesAlways))
        .unwrap();

    let target = repo.home_path("vimrc");
    assert!(is_symlink(&target));
    assert_eq!(fs::read_to_string(&target).unwrap(), "set nu\n");
    assert_eq!(
        fs::read_to_string(repo.backup_dir("vim").join("vimrc")).unwrap(),
        "old config\n"
    );
    assert_eq!(report.status(), FormulaStatus::Ok);
    assert_eq!(report.changed(), 1);
    assert!(matches!(
        report.outcomes[0].outcome,
        Outcome::Done(ResourceChange::Applied { backed_up: true })
    ));
}

#[test]
fn mount_twice_is_idempotent() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .build();
    let engine = repo.engine();

    engine.mount("vim", &mut session(Decision::YesAlways)).unwrap();
    let second = engine.mount("vim", &mut session(Decision::YesAlways)).unwrap();

    assert_eq!(second.changed(), 0);
    assert_eq!(second.unchanged(), 1);
    assert_eq!(repo.backup_count("vim"), 0, "nothing was displaced");
}

#[test]
fn patterns_matching_the_same_file_mount_it_once() {
    let manifest = r#"{ "path": { "gitconfig": ["$HOME"], "git*": ["$HOME", ".config"] } }"#;
    let repo = TestRepoBuilder::new()
        .formula(
            "git",
            manifest,
            &[("gitconfig", "[user]\n"), ("gitignore", "target/\n")],
        )
        .build();

    let report = repo
        .engine()
        .mount("git", &mut session(Decision::YesAlways))
        .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(is_symlink(&repo.home_path("gitconfig")));
    assert!(is_symlink(&repo.home_path(".config/gitignore")));
    assert!(!repo.home_path(".config/gitconfig").exists());
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn sources_escaping_the_formula_are_not_mounted() {
    let repo = TestRepoBuilder::new()
        .formula("evil", r#"{ "path": { "../*/secret": ["$HOME"] } }"#, &[])
        .formula("vault", r#"{ "path": {} }"#, &[("secret", "hunter2")])
        .build();

    let report = repo
        .engine()
        .mount("evil", &mut session(Decision::YesAlways))
        .unwrap();

    assert!(report.outcomes.is_empty());
    assert!(!repo.home_path("secret").exists());
    assert!(!report.warnings.is_empty());
}

#[test]
fn disabled_formula_is_skipped_but_listed() {
    let manifest = r#"{ "disabled": true, "path": { "vimrc": ["$HOME"] } }"#;
    let repo = TestRepoBuilder::new()
        .formula("vim", manifest, &[("vimrc", "set nu\n")])
        .build();
    let engine = repo.engine();

    let report = engine.mount("vim", &mut session(Decision::YesAlways)).unwrap();

    assert_eq!(report.status(), FormulaStatus::Skipped);
    assert!(!repo.home_path("vimrc").exists());
    assert_eq!(engine.list_formulae().unwrap(), vec!["vim"]);
}

#[test]
fn conflicting_mapping_does_not_stop_the_others() {
    let manifest = r#"{ "path": { "*rc": ["$HOME"] } }"#;
    let repo = TestRepoBuilder::new()
        .formula(
            "shell",
            manifest,
            &[("arc", "a"), ("brc", "b"), ("crc", "c")],
        )
        .home_dir("brc")
        .build();

    let report = repo
        .engine()
        .mount("shell", &mut session(Decision::YesAlways))
        .unwrap();

    assert_eq!(report.status(), FormulaStatus::Conflicts);
    assert_eq!(report.changed(), 2);
    assert_eq!(report.conflicts(), 1);
    assert!(is_symlink(&repo.home_path("arc")));
    assert!(repo.home_path("brc").is_dir());
    assert!(is_symlink(&repo.home_path("crc")));
    assert_eq!(repo.log.at("error").len(), 1);
}

#[test]
fn declined_purge_keeps_earlier_backups() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .home_file("vimrc", "new local edits\n")
        .backup_file("vim", "vimrc", "first backup\n")
        .build();

    let confirm = ScriptedConfirm::new(&[Decision::NoOnce]);
    let prompts = Arc::clone(&confirm.prompts);
    let report = repo
        .engine()
        .mount("vim", &mut Session::new(Box::new(confirm)))
        .unwrap();

    assert_eq!(prompts.lock().unwrap().len(), 1);
    assert_eq!(report.conflicts(), 1);
    assert!(matches!(
        &report.outcomes[0].outcome,
        Outcome::Conflict(ConflictError::BackupOccupied { .. })
    ));
    assert_eq!(
        fs::read_to_string(repo.backup_dir("vim").join("vimrc")).unwrap(),
        "first backup\n"
    );
    assert_eq!(
        fs::read_to_string(repo.home_path("vimrc")).unwrap(),
        "new local edits\n"
    );
}

#[test]
fn confirmed_purge_clears_stale_backups() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .backup_file("vim", "stale", "x")
        .build();

    repo.engine()
        .mount("vim", &mut session(Decision::YesOnce))
        .unwrap();

    assert!(!repo.backup_dir("vim").join("stale").exists());
    assert!(is_symlink(&repo.home_path("vimrc")));
}

#[test]
fn abort_stops_the_run() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .backup_file("vim", "stale", "x")
        .build();

    let err = repo
        .engine()
        .mount("vim", &mut session(Decision::Abort))
        .unwrap_err();

    assert!(matches!(err, DotmountError::Program(ProgramError::Aborted)));
    assert!(err.is_fatal());
    assert!(!repo.home_path("vimrc").exists());
}

#[test]
fn interrupt_stops_before_the_next_formula() {
    let repo = TestRepoBuilder::new()
        .formula("vim", VIM_MANIFEST, &[("vimrc", "set nu\n")])
        .build();
    let flag = Arc::new(AtomicBool::new(false));
    let mut session = session(Decision::YesAlways).with_interrupt(Arc::clone(&flag));

    flag.store(true, Ordering::SeqCst);
    let err = repo.engine().mount("vim", &mut session).unwrap_err();

    assert!(matches!(err, DotmountError::Program(ProgramError::Interrupted)));
    assert!(!repo.home_path("vimrc").exists());
}

#[test]
fn unknown_formula_is_reported() {
    let repo = TestRepoBuilder::new().build();

    let err = repo
        .engine()
        .mount("nope", &mut session(Decision::YesAlways))
        .unwrap_err();

    assert!(matches!(
        err,
        DotmountError::Validation(ValidationError::UnknownFormula(_))
    ));
    assert!(!err.is_fatal());
}

#[test]
fn missing_manifest_is_reported() {
    let repo = TestRepoBuilder::new().build();
    fs::create_dir_all(repo.formula_dir("bare")).unwrap();

    let err = repo
        .engine()
        .mount("bare", &mut session(Decision::YesAlways))
        .unwrap_err();

    assert!(matches!(
        err,
        DotmountError::Validation(ValidationError::Missing { .. })
    ));
}
