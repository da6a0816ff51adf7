//! Core logging types: formula entries, status, and the [`Log`] trait.

/// Per-formula result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaEntry {
    /// Formula identifier.
    pub name: String,
    /// Final status of the formula.
    pub status: FormulaStatus,
    /// Optional detail message (counts, skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaStatus {
    /// Every dotfile converged.
    Ok,
    /// The formula was not processed (e.g. disabled).
    Skipped,
    /// The formula was processed but some dotfiles hit conflicts or I/O errors.
    Conflicts,
    /// The formula could not be processed at all.
    Failed,
}

/// Abstraction over logging backends.
///
/// Engine code logs through this trait so tests can capture messages instead
/// of writing to the console.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a formula result for the summary.
    fn record(&self, name: &str, status: FormulaStatus, message: Option<&str>);
}
