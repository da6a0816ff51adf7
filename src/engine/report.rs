//! Per-formula outcome of a mount or unmount run.
use crate::error::{ConflictError, ResolutionWarning};
use crate::formula::DotfileMapping;
use crate::logging::FormulaStatus;
use crate::resources::ResourceChange;

/// What happened to one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mapping converged.
    Done(ResourceChange),
    /// The mapping was left alone because of a conflicting entry.
    Conflict(ConflictError),
    /// A file-system call failed.
    Failed(String),
}

/// One mapping and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOutcome {
    /// The mapping that was processed.
    pub mapping: DotfileMapping,
    /// What happened to it.
    pub outcome: Outcome,
}

/// Outcome of mounting or unmounting one formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaReport {
    /// Formula identifier.
    pub id: String,
    /// Whether the formula was skipped because it is disabled.
    pub disabled: bool,
    /// Per-mapping outcomes in enumeration order.
    pub outcomes: Vec<MappingOutcome>,
    /// Patterns and files skipped during enumeration.
    pub warnings: Vec<ResolutionWarning>,
}

impl FormulaReport {
    pub(super) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub(super) fn disabled(id: &str) -> Self {
        Self {
            disabled: true,
            ..Self::new(id)
        }
    }

    /// Mappings whose file system state changed.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Done(change) if change.changed()))
    }

    /// Mappings that needed nothing or were skipped.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Done(change) if !change.changed()))
    }

    /// Mappings left alone because of a conflict.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Conflict(_)))
    }

    /// Mappings whose file-system calls failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|m| pred(&m.outcome)).count()
    }

    /// Summary status of the formula.
    #[must_use]
    pub fn status(&self) -> FormulaStatus {
        if self.disabled {
            FormulaStatus::Skipped
        } else if self.conflicts() + self.failed() > 0 {
            FormulaStatus::Conflicts
        } else {
            FormulaStatus::Ok
        }
    }

    /// One-line description for the run summary, e.g. `2 changed, 1 unchanged`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.disabled {
            return "disabled".to_string();
        }
        let mut parts = vec![
            format!("{} changed", self.changed()),
            format!("{} unchanged", self.unchanged()),
        ];
        if self.conflicts() > 0 {
            parts.push(format!("{} conflicts", self.conflicts()));
        }
        if self.failed() > 0 {
            parts.push(format!("{} failed", self.failed()));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("{} warnings", self.warnings.len()));
        }
        parts.join(", ")
    }
}
