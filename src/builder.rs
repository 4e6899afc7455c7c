use std::fs;

use indexmap::IndexMap;

use crate::env::EnvVars;
use crate::error::DistconfError;
use crate::format::Format;
use crate::ops::ActionResult;
use crate::prompt::Prompt;
use crate::reconcile::Reconciler;
use crate::registry::Registry;
use crate::settings::{self, Settings};
use crate::types::{Action, EnvMapping};

/// Entry point for building a reconciler.
pub struct Distconf;

impl Distconf {
    pub fn builder() -> DistconfBuilder {
        DistconfBuilder::new()
    }
}

/// Builder for a [`Reconciler`].
///
/// Defaults: every built-in format registered, outdated keys pruned,
/// implicit environment lookup against the process environment, the `dist`
/// marker, and no prompt (non-interactive).
pub struct DistconfBuilder {
    registry: Registry,
    name: Option<String>,
    keep_outdated: bool,
    env_mapping: EnvMapping,
    env: Option<EnvVars>,
    dist_marker: String,
    prompt: Option<Box<dyn Prompt>>,
    dirs: IndexMap<String, String>,
}

impl DistconfBuilder {
    fn new() -> Self {
        Self {
            registry: Registry::with_defaults(),
            name: None,
            keep_outdated: false,
            env_mapping: EnvMapping::Implicit,
            env: None,
            dist_marker: "dist".to_string(),
            prompt: None,
            dirs: IndexMap::new(),
        }
    }

    /// Apply a loaded settings file. Does not touch the prompt: whether to
    /// ask questions depends on the terminal, which the caller knows.
    pub fn settings(self, settings: &Settings) -> Self {
        let mut builder = self.dist_marker(&settings.dist_marker);
        builder.keep_outdated = settings.keep_outdated;
        if let Some(name) = &settings.name {
            builder.name = Some(name.clone());
        }
        if let Some(map) = &settings.env_map {
            builder.env_mapping = EnvMapping::Explicit(map.clone());
        }
        if let Some(dirs) = &settings.dirs {
            builder.dirs = dirs.clone();
        }
        builder
    }

    /// Fix the base name instead of deriving it from each target file.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn keep_outdated(mut self, keep: bool) -> Self {
        self.keep_outdated = keep;
        self
    }

    /// Only look up the listed dotted keys, under the given variable names.
    pub fn env_map(mut self, map: IndexMap<String, String>) -> Self {
        self.env_mapping = EnvMapping::Explicit(map);
        self
    }

    /// Disable environment lookup entirely.
    pub fn no_env(mut self) -> Self {
        self.env_mapping = EnvMapping::Explicit(IndexMap::new());
        self
    }

    /// Use these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().collect());
        self
    }

    /// Trailing extension that marks templates (default: `dist`).
    pub fn dist_marker(mut self, marker: &str) -> Self {
        self.dist_marker = marker.trim_start_matches('.').to_string();
        self
    }

    /// Ask for missing values through `prompt`.
    pub fn prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Replace the format registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Map one more extension onto a format.
    pub fn register(mut self, extension: &str, format: Format) -> Self {
        self.registry.register(extension, format);
        self
    }

    /// `dist dir => target dir` pairs reconciled by [`Action::Run`].
    pub fn dirs(mut self, dirs: IndexMap<String, String>) -> Self {
        self.dirs = dirs;
        self
    }

    pub fn build(self) -> Reconciler {
        let env = match (self.env, &self.env_mapping) {
            (Some(env), _) => env,
            (None, EnvMapping::Explicit(map)) if map.is_empty() => EnvVars::default(),
            (None, _) => EnvVars::from_process(),
        };
        Reconciler {
            registry: self.registry,
            name: self.name,
            keep_outdated: self.keep_outdated,
            env_mapping: self.env_mapping,
            dist_marker: self.dist_marker,
            env,
            prompt: self.prompt,
        }
    }

    /// Handle an [`Action`] and print the result to stdout.
    pub fn handle_and_print(self, action: &Action) -> Result<ActionResult, DistconfError> {
        let result = self.handle(action)?;
        print!("{result}");
        Ok(result)
    }

    /// Handle an [`Action`] (run / file / dir / init).
    pub fn handle(self, action: &Action) -> Result<ActionResult, DistconfError> {
        match action {
            Action::Run => {
                if self.dirs.is_empty() {
                    return Err(DistconfError::NoDirectories);
                }
                let dirs = self.dirs.clone();
                let report = self.build().reconcile_dirs(&dirs)?;
                Ok(ActionResult::Report(report))
            }
            Action::File { target, dist } => {
                let outcome = self.build().reconcile_file(target, dist)?;
                Ok(ActionResult::File {
                    target: target.clone(),
                    outcome,
                })
            }
            Action::Dir {
                target_dir,
                dist_dir,
            } => {
                let report = self.build().reconcile_dir(target_dir, dist_dir)?;
                Ok(ActionResult::Report(report))
            }
            Action::Init { output } => {
                let template = settings::template();
                match output {
                    Some(path) => {
                        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                            fs::create_dir_all(parent).map_err(|e| DistconfError::IoError {
                                path: parent.to_path_buf(),
                                source: e,
                            })?;
                        }
                        fs::write(path, &template).map_err(|e| DistconfError::IoError {
                            path: path.clone(),
                            source: e,
                        })?;
                        Ok(ActionResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ActionResult::Template(template)),
                }
            }
        }
    }
}
