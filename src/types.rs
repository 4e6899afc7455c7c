use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::DistconfError;

/// How missing parameters map to environment variable names.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnvMapping {
    /// Derive `NAME_KEY_PATH` from the base name and the dotted key path.
    #[default]
    Implicit,
    /// Only the listed dotted key paths are looked up, under the given
    /// variable names. An empty map disables environment lookup.
    Explicit(IndexMap<String, String>),
}

/// What happened to a single target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Updated,
    /// The reconciled content matched the file on disk; nothing was written.
    Unchanged,
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Created => f.write_str("Created"),
            FileOutcome::Updated => f.write_str("Updated"),
            FileOutcome::Unchanged => f.write_str("Unchanged"),
        }
    }
}

/// Result of reconciling a directory (or several).
///
/// Per-file failures do not abort a batch; they are collected here.
#[derive(Debug, Default)]
pub struct DirReport {
    /// Target files that were reconciled, with their outcome.
    pub processed: Vec<(PathBuf, FileOutcome)>,
    /// Template files (or directories) that failed, with the reason.
    pub failed: Vec<(PathBuf, DistconfError)>,
}

impl DirReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn extend(&mut self, other: DirReport) {
        self.processed.extend(other.processed);
        self.failed.extend(other.failed);
    }
}

impl fmt::Display for DirReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, outcome) in &self.processed {
            writeln!(f, "{outcome} {}", path.display())?;
        }
        for (path, err) in &self.failed {
            writeln!(f, "Skipped {}: {err}", path.display())?;
        }
        Ok(())
    }
}

/// A distconf operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Reconcile every `dist => target` directory pair from the settings.
    Run,
    /// Reconcile one target file against one template file.
    File { target: PathBuf, dist: PathBuf },
    /// Reconcile every template in `dist_dir` into `target_dir`.
    Dir { target_dir: PathBuf, dist_dir: PathBuf },
    /// Generate a commented settings file.
    Init { output: Option<PathBuf> },
}
