//! Destination path templates.
//!
//! A template is a list of segments joined into a directory.  Segments that
//! start with [`ENV_PREFIX`] name an environment variable; a leading `~`
//! expands to the home directory.  Resolution stops at the first token that
//! cannot be resolved.
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Marks a segment as an environment variable reference (`$HOME`).
pub const ENV_PREFIX: char = '$';

/// Source of environment variables and the home directory.
pub trait Environment: std::fmt::Debug {
    /// Value of the variable `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    /// The user's home directory.
    fn home(&self) -> Option<PathBuf> {
        self.var("HOME")
            .or_else(|| self.var("USERPROFILE"))
            .map(PathBuf::from)
    }
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Outcome of resolving a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The absolute destination directory.
    Dir(PathBuf),
    /// `token` could not be resolved; the whole template is unusable.
    Unresolved {
        /// The first offending token, as written in the template.
        token: String,
    },
}

/// Resolve a template into an absolute directory.
///
/// Empty variable values count as unresolved.  A relative result is taken
/// relative to the home directory.
pub fn resolve(segments: &[String], env: &dyn Environment) -> Resolved {
    let mut dir = PathBuf::new();
    for segment in segments {
        let part = match segment.strip_prefix(ENV_PREFIX) {
            Some(name) => match env.var(name).filter(|v| !v.is_empty()) {
                Some(value) => value,
                None => {
                    return Resolved::Unresolved {
                        token: segment.clone(),
                    };
                }
            },
            None => segment.clone(),
        };
        dir.push(part);
    }

    let dir = match expand_home(&dir, env) {
        Ok(dir) => dir,
        Err(token) => return Resolved::Unresolved { token },
    };

    if dir.is_absolute() {
        return Resolved::Dir(dir);
    }
    env.home().map_or_else(
        || Resolved::Unresolved {
            token: "~".to_string(),
        },
        |home| Resolved::Dir(home.join(dir)),
    )
}

/// Replace a leading `~` component with the home directory.
fn expand_home(path: &Path, env: &dyn Environment) -> Result<PathBuf, String> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = env.home().ok_or_else(|| "~".to_string())?;
            Ok(home.join(components.as_path()))
        }
        _ => Ok(path.to_path_buf()),
    }
}
