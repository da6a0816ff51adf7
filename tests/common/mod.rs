// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed repository with a fake home
// directory, and a fluent builder so each integration test can lay out
// formulae and pre-existing files without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotmount::config::Layout;
use dotmount::config::manifest::MANIFEST_FILE;
use dotmount::config::template::MapEnv;
use dotmount::engine::Engine;
use dotmount::logging::{FormulaStatus, Log};
use dotmount::prompt::{Confirm, Decision, FixedAnswer, Session};

/// A [`Log`] that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .expect("log mutex")
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level` (`"warn"`, `"error"`, ...).
    pub fn at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .expect("log mutex")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record(&self, name: &str, status: FormulaStatus, _message: Option<&str>) {
        self.push("record", &format!("{name} {status:?}"));
    }
}

/// Replays scripted decisions and records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Vec<Decision>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[Decision]) -> Self {
        let mut answers = answers.to_vec();
        answers.reverse();
        Self {
            answers,
            prompts: Arc::default(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> Decision {
        self.prompts
            .lock()
            .expect("prompt mutex")
            .push(prompt.to_string());
        self.answers.pop().unwrap_or(Decision::Abort)
    }
}

/// An isolated repository backed by a [`tempfile::TempDir`].
///
/// Layout: `<root>/formulae/<id>/`, `<root>/backups/<id>/` and a fake home
/// directory at `<root>/home` exposed to templates as `$HOME`.
pub struct TestRepo {
    /// Keeps the directory alive.
    _tmp: tempfile::TempDir,
    /// Canonical repository root.
    pub root: PathBuf,
    /// Fake home directory.
    pub home: PathBuf,
    /// Messages logged by engines created with [`TestRepo::engine`].
    pub log: Arc<RecordingLog>,
}

impl TestRepo {
    /// Directory layout of the repository.
    pub fn layout(&self) -> Layout {
        Layout::new(self.root.join("formulae"), self.root.join("backups"))
    }

    /// Engine resolving `$HOME` to [`TestRepo::home`].
    pub fn engine(&self) -> Engine {
        let env = MapEnv::new()
            .with("HOME", self.home.to_string_lossy())
            .with("XDG_CONFIG_HOME", self.home.join(".config").to_string_lossy());
        Engine::new(
            self.layout(),
            Box::new(env),
            Arc::clone(&self.log) as Arc<dyn Log>,
        )
    }

    /// Source directory of formula `id`.
    pub fn formula_dir(&self, id: &str) -> PathBuf {
        self.layout().formula_dir(id)
    }

    /// Backup directory of formula `id`.
    pub fn backup_dir(&self, id: &str) -> PathBuf {
        self.layout().backup_dir(id)
    }

    /// Path under the fake home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Number of entries in the backup directory of `id` (0 if absent).
    pub fn backup_count(&self, id: &str) -> usize {
        std::fs::read_dir(self.backup_dir(id)).map_or(0, Iterator::count)
    }

    /// Replace the repository root with `[ROOT]` in `text`.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&*self.root.to_string_lossy(), "[ROOT]")
    }
}

/// Session answering every question with `decision`.
pub fn session(decision: Decision) -> Session {
    Session::new(Box::new(FixedAnswer(decision)))
}

/// Whether `path` is a symlink.
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin building an empty repository.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(tmp.path()).expect("canonicalize temp dir");
        let home = root.join("home");
        std::fs::create_dir_all(root.join("formulae")).expect("create formulae dir");
        std::fs::create_dir_all(&home).expect("create home dir");
        Self {
            repo: TestRepo {
                _tmp: tmp,
                root,
                home,
                log: Arc::default(),
            },
        }
    }

    /// Add formula `id` with `manifest` and files `(relative path, content)`.
    pub fn formula(self, id: &str, manifest: &str, files: &[(&str, &str)]) -> Self {
        let dir = self.repo.formula_dir(id);
        std::fs::create_dir_all(&dir).expect("create formula dir");
        std::fs::write(dir.join(MANIFEST_FILE), manifest).expect("write manifest");
        for (rel, content) in files {
            let path = dir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create formula subdir");
            }
            std::fs::write(path, content).expect("write formula file");
        }
        self
    }

    /// Create a regular file under the fake home directory.
    pub fn home_file(self, rel: &str, content: &str) -> Self {
        let path = self.repo.home_path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create home subdir");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    /// Create a directory under the fake home directory.
    pub fn home_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.repo.home_path(rel)).expect("create home dir");
        self
    }

    /// Create a file in the backup directory of formula `id`.
    pub fn backup_file(self, id: &str, name: &str, content: &str) -> Self {
        let dir = self.repo.backup_dir(id);
        std::fs::create_dir_all(&dir).expect("create backup dir");
        std::fs::write(dir.join(name), content).expect("write backup file");
        self
    }

    /// Finish building and return the repository.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}
