//! Result type for [`Action`](crate::Action) handling.

use std::fmt;
use std::path::PathBuf;

use crate::types::{DirReport, FileOutcome};

/// Result of handling an action. Returned to the caller for display.
#[derive(Debug)]
pub enum ActionResult {
    /// A generated settings template.
    Template(String),
    /// Confirmation that a settings template was written to a file.
    TemplateWritten { path: PathBuf },
    /// Outcome of a single-file reconciliation.
    File { target: PathBuf, outcome: FileOutcome },
    /// Outcome of one or more directory reconciliations.
    Report(DirReport),
}

impl ActionResult {
    /// Whether any template failed. The binary exits non-zero on this.
    pub fn has_failures(&self) -> bool {
        match self {
            ActionResult::Report(report) => report.has_failures(),
            _ => false,
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Template(t) => write!(f, "{t}"),
            ActionResult::TemplateWritten { path } => {
                writeln!(f, "Settings template written to {}", path.display())
            }
            ActionResult::File { target, outcome } => {
                writeln!(f, "{outcome} {}", target.display())
            }
            ActionResult::Report(report) => write!(f, "{report}"),
        }
    }
}
