//! Log file location, escape-code stripping and timestamps.
use std::path::PathBuf;

/// Overrides the directory log files are written to.
pub(super) const LOG_DIR_ENV: &str = "DOTMOUNT_LOG_DIR";

/// Remove terminal escape sequences so log files stay plain text.
///
/// CSI sequences (`ESC [ ... final`) are dropped whole; any other escape
/// drops only the character following `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    #[derive(Clone, Copy)]
    enum State {
        Text,
        Escape,
        Csi,
    }

    let mut state = State::Text;
    s.chars()
        .filter(|&c| match (state, c) {
            (State::Text, '\x1b') => {
                state = State::Escape;
                false
            }
            (State::Text, _) => true,
            (State::Escape, '[') => {
                state = State::Csi;
                false
            }
            (State::Escape, _) => {
                state = State::Text;
                false
            }
            (State::Csi, '@'..='~') => {
                state = State::Text;
                false
            }
            (State::Csi, _) => false,
        })
        .collect()
}

/// Directory holding log files, created on demand.
///
/// `$DOTMOUNT_LOG_DIR` wins; otherwise `$XDG_CACHE_HOME/dotmount`, falling
/// back to `~/.cache/dotmount`.
pub(super) fn log_dir() -> Option<PathBuf> {
    let dir = if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        PathBuf::from(dir)
    } else {
        let cache = std::env::var_os("XDG_CACHE_HOME").map_or_else(
            || {
                std::env::var_os("HOME")
                    .or_else(|| std::env::var_os("USERPROFILE"))
                    .map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".cache")
            },
            PathBuf::from,
        );
        cache.join("dotmount")
    };
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file of one `command` run, e.g. `mount.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(command).with_extension("log"))
}

/// Local date and time with offset, for the run header.
pub(super) fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Local wall-clock time with milliseconds, prefixed to every log line.
pub(super) fn clock() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}
