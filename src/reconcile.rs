//! File-level reconciliation: read a template and its target, merge, and
//! write the target back only when its content changes.
//!
//! Format selection is by extension. A trailing distribution marker
//! (`parameters.yml.dist`) is stripped before lookup and never maps to a
//! format itself. In a directory run, a double extension converts between
//! formats: `app.ini.json` is read as JSON and written to `app.ini`.

use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::env::EnvVars;
use crate::error::DistconfError;
use crate::format::Format;
use crate::merge::{self, MergeOptions};
use crate::prompt::Prompt;
use crate::registry::Registry;
use crate::types::{DirReport, EnvMapping, FileOutcome};

/// Reconciles target files against their templates.
///
/// Built with [`Distconf::builder()`](crate::Distconf::builder). Holds the
/// format registry, the merge settings and the environment snapshot for a
/// whole run; files are processed one at a time.
pub struct Reconciler {
    pub(crate) registry: Registry,
    pub(crate) name: Option<String>,
    pub(crate) keep_outdated: bool,
    pub(crate) env_mapping: EnvMapping,
    pub(crate) dist_marker: String,
    pub(crate) env: EnvVars,
    pub(crate) prompt: Option<Box<dyn Prompt>>,
}

impl Reconciler {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_interactive(&self) -> bool {
        self.prompt.is_some()
    }

    /// Reconcile `target` against the template at `dist`.
    ///
    /// The template is parsed with its own format and the target with the
    /// target's, so the pair may differ (`app.ini` from `app.json.dist`).
    pub fn reconcile_file(&mut self, target: &Path, dist: &Path) -> Result<FileOutcome, DistconfError> {
        let dist_format = self.format_for(dist)?;
        let target_format = self.format_for(target)?;

        if !dist.is_file() {
            return Err(DistconfError::MissingTemplate(dist.to_path_buf()));
        }

        let dist_content = read(dist)?;
        let expected = dist_format
            .parse(&dist_content)
            .map_err(|source| DistconfError::ParseError {
                path: dist.to_path_buf(),
                source,
            })?;

        let old_content = match fs::read_to_string(target) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(DistconfError::IoError {
                    path: target.to_path_buf(),
                    source: e,
                });
            }
        };
        let current = target_format
            .parse(old_content.as_deref().unwrap_or(""))
            .map_err(|source| DistconfError::ParseError {
                path: target.to_path_buf(),
                source,
            })?;

        let options = MergeOptions {
            name: self.name.clone().or_else(|| self.base_name(target)),
            keep_outdated: self.keep_outdated,
            env: self.env_mapping.clone(),
        };
        debug!(target = %target.display(), dist = %dist.display(), name = ?options.name, "Reconciling");

        let prompt = self.prompt.as_mut().map(|p| &mut **p as &mut dyn Prompt);
        let params = merge::update_params(&expected, current, &options, &self.env, prompt)?;

        let new_content = target_format
            .dump(&params)
            .map_err(|source| DistconfError::DumpError {
                path: target.to_path_buf(),
                source,
            })?;

        let outcome = match &old_content {
            Some(old) if *old == new_content => {
                debug!(path = %target.display(), "Unchanged");
                return Ok(FileOutcome::Unchanged);
            }
            Some(_) => FileOutcome::Updated,
            None => FileOutcome::Created,
        };

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.is_dir()
        {
            info!(dir = %parent.display(), "Creating directory");
            fs::create_dir_all(parent).map_err(|e| DistconfError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        write_atomic(target, &new_content)?;
        info!(path = %target.display(), "{outcome}");
        Ok(outcome)
    }

    /// Reconcile every template in `dist_dir` into `target_dir`.
    ///
    /// Only regular files directly inside `dist_dir` with a registered
    /// extension are considered, in file-name order. A failing file is
    /// logged and recorded in the report; the batch carries on.
    pub fn reconcile_dir(&mut self, target_dir: &Path, dist_dir: &Path) -> Result<DirReport, DistconfError> {
        if self.registry.is_empty() {
            return Err(DistconfError::NoParsers);
        }

        let mut templates = self.list_templates(dist_dir)?;
        templates.sort();
        debug!(dir = %dist_dir.display(), count = templates.len(), "Found templates");

        let mut report = DirReport::default();
        for (file_name, target_name) in templates {
            let dist = dist_dir.join(&file_name);
            let target = target_dir.join(&target_name);
            match self.reconcile_file(&target, &dist) {
                Ok(outcome) => report.processed.push((target, outcome)),
                Err(e) => {
                    warn!(path = %dist.display(), error = %e, "Skipping template");
                    report.failed.push((dist, e));
                }
            }
        }
        Ok(report)
    }

    /// Apply [`reconcile_dir`](Self::reconcile_dir) to each
    /// `dist dir => target dir` pair, in order.
    ///
    /// A directory that cannot be processed at all is recorded as a failure
    /// and the remaining pairs still run.
    pub fn reconcile_dirs(&mut self, dirs: &IndexMap<String, String>) -> Result<DirReport, DistconfError> {
        if self.registry.is_empty() {
            return Err(DistconfError::NoParsers);
        }

        let mut report = DirReport::default();
        for (dist_dir, target_dir) in dirs {
            let dist_dir = Path::new(dist_dir);
            match self.reconcile_dir(Path::new(target_dir), dist_dir) {
                Ok(dir_report) => report.extend(dir_report),
                Err(e) => {
                    warn!(dir = %dist_dir.display(), error = %e, "Skipping directory");
                    report.failed.push((dist_dir.to_path_buf(), e));
                }
            }
        }
        Ok(report)
    }

    /// Target file name for a template file name, or `None` when the
    /// template's extension is not registered.
    ///
    /// - `parameters.yml.dist` gives `parameters.yml`
    /// - `app.ini.json` gives `app.ini` when `ini` is registered
    /// - `app.v2.json` gives `app.v2.json` when `v2` is not
    pub fn target_file_name(&self, dist_name: &str) -> Option<String> {
        let stripped = strip_marker(dist_name, &self.dist_marker);
        let (stem, extension) = split_extension(stripped)?;
        if !self.registry.contains(extension) {
            return None;
        }
        match split_extension(stem) {
            Some((_, inner)) if self.registry.contains(inner) => Some(stem.to_string()),
            _ => Some(stripped.to_string()),
        }
    }

    fn format_for(&self, path: &Path) -> Result<Format, DistconfError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| strip_marker(n, &self.dist_marker))
            .unwrap_or("");
        let extension = split_extension(file_name).map_or("", |(_, ext)| ext);
        self.registry
            .get(extension)
            .ok_or_else(|| DistconfError::UnregisteredFormat {
                extension: extension.to_string(),
                path: path.to_path_buf(),
            })
    }

    /// `config/parameters.yml` gives `parameters`.
    fn base_name(&self, target: &Path) -> Option<String> {
        let file_name = target.file_name()?.to_str()?;
        let stripped = strip_marker(file_name, &self.dist_marker);
        let stem = split_extension(stripped).map_or(stripped, |(stem, _)| stem);
        (!stem.is_empty()).then(|| stem.to_string())
    }

    /// `(template file name, target file name)` for every candidate in `dir`.
    fn list_templates(&self, dir: &Path) -> Result<Vec<(String, String)>, DistconfError> {
        let io_error = |e: io::Error| DistconfError::IoError {
            path: dir.to_path_buf(),
            source: e,
        };

        let mut templates = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if !entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(target_name) = self.target_file_name(&file_name) {
                templates.push((file_name, target_name));
            }
        }
        Ok(templates)
    }
}

fn strip_marker<'a>(file_name: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return file_name;
    }
    file_name
        .strip_suffix(marker)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(file_name)
}

/// `("app.ini", "json")` for `app.ini.json`. Dotfiles and names without a
/// dot have no extension.
fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    file_name
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

fn read(path: &Path) -> Result<String, DistconfError> {
    fs::read_to_string(path).map_err(|e| DistconfError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write through a sibling temporary file and rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<(), DistconfError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.distconf-tmp"));

    let result = fs::write(&tmp, content)
        .and_then(|()| match fs::metadata(path) {
            Ok(meta) => fs::set_permissions(&tmp, meta.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        })
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(DistconfError::IoError {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}
