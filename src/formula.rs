//! Formulae and the dotfiles they manage.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::Layout;
use crate::config::manifest::{MANIFEST_FILE, Manifest, PathRule};
use crate::config::template::{self, Environment, Resolved};
use crate::error::{ResolutionWarning, ValidationError};
use crate::logging::Log;

/// Operating-system metadata files that are never mounted.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// A formula with its validated manifest.
#[derive(Debug, Clone)]
pub struct Formula {
    /// Directory name under the formulae root.
    pub id: String,
    /// Canonical source directory.
    pub dir: PathBuf,
    /// Backup directory (may not exist yet).
    pub backup_dir: PathBuf,
    /// Parsed manifest.
    pub manifest: Manifest,
}

impl Formula {
    /// Load formula `id` from `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownFormula`] if there is no such
    /// directory, or the manifest's validation error.
    pub fn load(id: &str, layout: &Layout) -> Result<Self, ValidationError> {
        let dir = dunce::canonicalize(layout.formula_dir(id))
            .ok()
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| ValidationError::UnknownFormula(id.to_string()))?;
        let manifest = Manifest::load(&dir.join(MANIFEST_FILE))?;
        Ok(Self {
            id: id.to_string(),
            dir,
            backup_dir: layout.backup_dir(id),
            manifest,
        })
    }

    /// Enumerate this formula's dotfiles.
    pub fn dotfiles<'a>(&'a self, env: &'a dyn Environment, log: &'a dyn Log) -> Dotfiles<'a> {
        Dotfiles {
            formula: self,
            env,
            log,
            rules: self.manifest.rules.iter(),
            current: None,
            seen: HashSet::new(),
            warnings: Vec::new(),
        }
    }
}

/// One managed file: where it lives, where it goes, where its predecessor is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfileMapping {
    /// Canonical path inside the formula directory.
    pub source: PathBuf,
    /// Destination directory joined with the source's file name.
    pub target: PathBuf,
    /// Backup directory joined with the source's file name.
    pub backup: PathBuf,
}

/// Single-pass iterator over a formula's [`DotfileMapping`]s.
///
/// Patterns are visited in declaration order. Problems with a pattern or a
/// matched file are logged as warnings, collected in
/// [`warnings`](Self::warnings), and skipped.
pub struct Dotfiles<'a> {
    formula: &'a Formula,
    env: &'a dyn Environment,
    log: &'a dyn Log,
    rules: std::slice::Iter<'a, PathRule>,
    current: Option<(PathBuf, glob::Paths)>,
    seen: HashSet<PathBuf>,
    warnings: Vec<ResolutionWarning>,
}

impl std::fmt::Debug for Dotfiles<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dotfiles")
            .field("formula", &self.formula.id)
            .field("seen", &self.seen.len())
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl Dotfiles<'_> {
    /// Warnings raised so far.
    #[must_use]
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    fn warn(&mut self, warning: ResolutionWarning) {
        self.log.warn(&format!("{}: {warning}", self.formula.id));
        self.warnings.push(warning);
    }

    /// Resolve a rule's destination and start globbing its pattern.
    fn start(&mut self, rule: &PathRule) {
        let dest = match template::resolve(&rule.destination, self.env) {
            Resolved::Dir(dir) => dir,
            Resolved::Unresolved { token } => {
                self.warn(ResolutionWarning::UnresolvedToken {
                    pattern: rule.pattern.clone(),
                    token,
                });
                return;
            }
        };

        let full = format!(
            "{}/{}",
            glob::Pattern::escape(&self.formula.dir.to_string_lossy()),
            rule.pattern
        );
        match glob::glob(&full) {
            Ok(paths) => self.current = Some((dest, paths)),
            Err(e) => self.warn(ResolutionWarning::InvalidPattern {
                pattern: rule.pattern.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Turn a glob match into a mapping, or `None` if it must be skipped.
    fn accept(&mut self, path: &Path, dest: &Path) -> Option<DotfileMapping> {
        let name = path.file_name()?.to_os_string();
        if name == MANIFEST_FILE
            || IGNORED_FILES.iter().any(|f| name == *f)
            || name.to_string_lossy().starts_with("._")
        {
            return None;
        }

        let meta = match path.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) => {
                self.warn(ResolutionWarning::Unreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return None;
            }
        };
        if meta.is_symlink() {
            self.warn(ResolutionWarning::SymlinkedSource {
                path: path.to_path_buf(),
            });
            return None;
        }
        if meta.is_dir() {
            self.log.debug(&format!("{}: skipping directory", path.display()));
            return None;
        }

        let source = match dunce::canonicalize(path) {
            Ok(source) => source,
            Err(e) => {
                self.warn(ResolutionWarning::Unreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return None;
            }
        };
        if !source.starts_with(&self.formula.dir) {
            self.warn(ResolutionWarning::EscapesRoot { path: source });
            return None;
        }
        if !self.seen.insert(source.clone()) {
            self.warn(ResolutionWarning::DuplicateSource { path: source });
            return None;
        }

        Some(DotfileMapping {
            target: dest.join(&name),
            backup: self.formula.backup_dir.join(&name),
            source,
        })
    }
}

impl Iterator for Dotfiles<'_> {
    type Item = DotfileMapping;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let matched = match &mut self.current {
                Some((dest, paths)) => paths.next().map(|entry| (dest.clone(), entry)),
                None => {
                    let rule = self.rules.next()?;
                    self.start(rule);
                    continue;
                }
            };
            match matched {
                Some((dest, Ok(path))) => {
                    if let Some(mapping) = self.accept(&path, &dest) {
                        return Some(mapping);
                    }
                }
                Some((_, Err(e))) => self.warn(ResolutionWarning::Unreadable {
                    path: e.path().to_path_buf(),
                    message: e.error().to_string(),
                }),
                None => self.current = None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::template::MapEnv;
    use crate::logging::CapturedLog;
    use std::fs;

    struct Fixture {
        _tmp: tempfile::TempDir,
        layout: Layout,
        home: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = dunce::canonicalize(tmp.path()).unwrap();
            let home = root.join("home");
            fs::create_dir_all(&home).unwrap();
            Self {
                layout: Layout::new(root.join("formulae"), root.join("backups")),
                home,
                _tmp: tmp,
            }
        }

        fn formula(&self, id: &str, manifest: &str, files: &[&str]) -> PathBuf {
            let dir = self.layout.formula_dir(id);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
            for file in files {
                let path = dir.join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, file).unwrap();
            }
            dir
        }

        fn env(&self) -> MapEnv {
            MapEnv::new().with("HOME", self.home.to_string_lossy())
        }
    }

    fn collect(formula: &Formula, env: &MapEnv, log: &CapturedLog) -> Vec<DotfileMapping> {
        formula.dotfiles(env, log).collect()
    }

    #[test]
    fn load_unknown_formula() {
        let fx = Fixture::new();
        let err = Formula::load("nope", &fx.layout).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownFormula(id) if id == "nope"));
    }

    #[test]
    fn load_without_manifest() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.layout.formula_dir("bare")).unwrap();
        let err = Formula::load("bare", &fx.layout).unwrap_err();
        assert!(matches!(err, ValidationError::Missing { .. }));
    }

    #[test]
    fn vim_mapping() {
        let fx = Fixture::new();
        let dir = fx.formula("vim", r#"{"path": {"vimrc": ["$HOME"]}}"#, &["vimrc"]);
        let formula = Formula::load("vim", &fx.layout).unwrap();
        let log = CapturedLog::default();

        let mappings = collect(&formula, &fx.env(), &log);
        assert_eq!(
            mappings,
            vec![DotfileMapping {
                source: dir.join("vimrc"),
                target: fx.home.join("vimrc"),
                backup: fx.layout.backup_dir("vim").join("vimrc"),
            }]
        );
        assert!(log.at("warn").is_empty());
    }

    #[test]
    fn manifest_and_metadata_files_are_skipped() {
        let fx = Fixture::new();
        fx.formula(
            "zsh",
            r#"{"path": {"*": ["$HOME"]}}"#,
            &["zshrc", ".DS_Store", "Thumbs.db", "._zshrc", "sub/nested"],
        );
        let formula = Formula::load("zsh", &fx.layout).unwrap();
        let log = CapturedLog::default();

        let names: Vec<_> = collect(&formula, &fx.env(), &log)
            .into_iter()
            .map(|m| m.target.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["zshrc"]);
    }

    #[test]
    fn hidden_files_match_wildcards() {
        let fx = Fixture::new();
        fx.formula("bash", r#"{"path": {"*": ["$HOME"]}}"#, &[".bashrc"]);
        let formula = Formula::load("bash", &fx.layout).unwrap();
        let log = CapturedLog::default();
        assert_eq!(collect(&formula, &fx.env(), &log).len(), 1);
    }

    #[test]
    fn duplicate_sources_are_yielded_once() {
        let fx = Fixture::new();
        fx.formula(
            "git",
            r#"{"path": {"gitconfig": ["$HOME"], "git*": ["~", ".config"]}}"#,
            &["gitconfig", "gitignore"],
        );
        let formula = Formula::load("git", &fx.layout).unwrap();
        let env = fx.env();
        let log = CapturedLog::default();

        let mut dotfiles = formula.dotfiles(&env, &log);
        let mappings: Vec<_> = dotfiles.by_ref().collect();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].target, fx.home.join("gitconfig"));
        assert_eq!(mappings[1].target, fx.home.join(".config").join("gitignore"));
        assert!(matches!(
            dotfiles.warnings(),
            [ResolutionWarning::DuplicateSource { .. }]
        ));
    }

    #[test]
    fn unresolved_token_skips_only_that_pattern() {
        let fx = Fixture::new();
        fx.formula(
            "nvim",
            r#"{"path": {"init.lua": ["$XDG_CONFIG_HOME", "nvim"], "vimrc": ["$HOME"]}}"#,
            &["init.lua", "vimrc"],
        );
        let formula = Formula::load("nvim", &fx.layout).unwrap();
        let env = fx.env();
        let log = CapturedLog::default();

        let mut dotfiles = formula.dotfiles(&env, &log);
        let mappings: Vec<_> = dotfiles.by_ref().collect();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].target, fx.home.join("vimrc"));
        assert_eq!(
            dotfiles.warnings(),
            [ResolutionWarning::UnresolvedToken {
                pattern: "init.lua".to_string(),
                token: "$XDG_CONFIG_HOME".to_string(),
            }]
        );
        assert!(log.at("warn")[0].contains("$XDG_CONFIG_HOME"));
    }

    #[test]
    fn invalid_pattern_is_a_warning() {
        let fx = Fixture::new();
        fx.formula("bad", r#"{"path": {"[": ["$HOME"], "rc": ["$HOME"]}}"#, &["rc"]);
        let formula = Formula::load("bad", &fx.layout).unwrap();
        let env = fx.env();
        let log = CapturedLog::default();

        let mut dotfiles = formula.dotfiles(&env, &log);
        assert_eq!(dotfiles.by_ref().count(), 1);
        assert!(matches!(
            dotfiles.warnings(),
            [ResolutionWarning::InvalidPattern { .. }]
        ));
    }

    #[test]
    fn sources_outside_the_formula_are_rejected() {
        let fx = Fixture::new();
        fx.formula("evil", r#"{"path": {"../other/*": ["$HOME"]}}"#, &[]);
        fx.formula("other", "{}", &["secret"]);
        let formula = Formula::load("evil", &fx.layout).unwrap();
        let env = fx.env();
        let log = CapturedLog::default();

        let mut dotfiles = formula.dotfiles(&env, &log);
        assert_eq!(dotfiles.by_ref().count(), 0);
        assert!(
            dotfiles
                .warnings()
                .iter()
                .any(|w| matches!(w, ResolutionWarning::EscapesRoot { .. }))
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_sources_are_rejected() {
        let fx = Fixture::new();
        let dir = fx.formula("tmux", r#"{"path": {"*": ["$HOME"]}}"#, &["tmux.conf"]);
        std::os::unix::fs::symlink(dir.join("tmux.conf"), dir.join("alias.conf")).unwrap();
        let formula = Formula::load("tmux", &fx.layout).unwrap();
        let env = fx.env();
        let log = CapturedLog::default();

        let mut dotfiles = formula.dotfiles(&env, &log);
        let mappings: Vec<_> = dotfiles.by_ref().collect();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].source, dir.join("tmux.conf"));
        assert!(matches!(
            dotfiles.warnings(),
            [ResolutionWarning::SymlinkedSource { .. }]
        ));
    }

    #[test]
    fn missing_path_manages_nothing() {
        let fx = Fixture::new();
        fx.formula("meta", r#"{"name": "Meta"}"#, &["file"]);
        let formula = Formula::load("meta", &fx.layout).unwrap();
        let log = CapturedLog::default();
        assert!(collect(&formula, &fx.env(), &log).is_empty());
    }
}
