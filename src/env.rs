//! Environment lookup for missing parameters.
//!
//! A missing leaf at dotted path `parameters.db.host` in a file named `app`
//! is looked up as `APP_PARAMETERS_DB_HOST`: the base name and the path are
//! uppercased, dots become underscores, and the two are joined with `_`.
//! With an explicit [`EnvMapping`], only listed paths are looked up, under
//! the variable names given there.

use std::collections::HashMap;

use crate::codec;
use crate::types::EnvMapping;
use crate::value::Value;

/// A snapshot of environment variables.
///
/// Built from the process environment in production; tests pass synthetic
/// pairs instead of mutating the real environment.
#[derive(Debug, Clone, Default)]
pub struct EnvVars(HashMap<String, String>);

impl EnvVars {
    /// Capture the current process environment. Variables whose name or
    /// value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// The value of `name`, if set and non-empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvVars(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Derive the variable name for a dotted key path.
pub fn implicit_var_name(name: Option<&str>, path: &str) -> String {
    let key = path.to_uppercase().replace('.', "_");
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("{}_{key}", name.to_uppercase()),
        None => key,
    }
}

/// The variable consulted for `path`, or `None` when an explicit mapping
/// does not list it.
pub fn var_name_for(mapping: &EnvMapping, name: Option<&str>, path: &str) -> Option<String> {
    match mapping {
        EnvMapping::Implicit => Some(implicit_var_name(name, path)),
        EnvMapping::Explicit(map) => map.get(path).cloned(),
    }
}

/// Look up and decode the environment value for `path`.
pub fn lookup(env: &EnvVars, mapping: &EnvMapping, name: Option<&str>, path: &str) -> Option<Value> {
    let var = var_name_for(mapping, name, path)?;
    let raw = env.get(&var)?;
    tracing::trace!(key = path, var = %var, "Found environment value");
    Some(codec::decode(raw))
}
