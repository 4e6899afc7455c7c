//! Tool settings: `distconf.toml` plus `DISTCONF_*` environment overrides.
//!
//! ```toml
//! keep_outdated = false
//! dist_marker = "dist"
//!
//! [dirs]
//! "app/config/dist" = "app/config"
//!
//! [env_map]
//! "database.password" = "DB_PASSWORD"
//! ```
//!
//! The file is optional. Unknown keys in it are rejected with their line
//! number. Environment variables win over the file; command-line flags are
//! applied on top by the caller.

use std::fs;
use std::io;
use std::path::Path;

use confique::Config;
use indexmap::IndexMap;

use crate::error::DistconfError;
use crate::validate;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_FILE: &str = "distconf.toml";

#[derive(Config, Debug)]
#[config(layer_attr(derive(Debug)))]
pub struct Settings {
    /// Keep keys that are no longer present in the template.
    #[config(default = false, env = "DISTCONF_KEEP_OUTDATED")]
    pub keep_outdated: bool,

    /// Ask for missing values when running in a terminal.
    #[config(default = true, env = "DISTCONF_INTERACTIVE")]
    pub interactive: bool,

    /// Trailing extension that marks a template file.
    #[config(default = "dist", env = "DISTCONF_DIST_MARKER")]
    pub dist_marker: String,

    /// Base name for environment variable prefixes and prompts. Defaults to
    /// each target file's stem.
    #[config(env = "DISTCONF_NAME")]
    pub name: Option<String>,

    /// Explicit `dotted.key = "ENV_VAR"` mapping. When set, only listed keys
    /// are read from the environment.
    pub env_map: Option<IndexMap<String, String>>,

    /// Template directory to target directory pairs reconciled by `run`.
    pub dirs: Option<IndexMap<String, String>>,
}

impl Settings {
    /// Load settings from `path` (a missing file means defaults) and the
    /// environment.
    pub fn load(path: &Path) -> Result<Settings, DistconfError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                String::new()
            }
            Err(e) => {
                return Err(DistconfError::IoError {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let layer = validate::parse_layer::<Settings>(&content, path)?;
        Ok(Settings::builder().env().preloaded(layer).load()?)
    }
}

/// Commented settings template generated from the doc comments above.
pub fn template() -> String {
    confique::toml::template::<Settings>(confique::toml::FormatOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join(DEFAULT_FILE)).unwrap();
        assert!(!settings.keep_outdated);
        assert!(settings.interactive);
        assert_eq!(settings.dist_marker, "dist");
        assert!(settings.dirs.is_none());
    }

    #[test]
    fn reads_tables_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILE);
        fs::write(
            &path,
            "keep_outdated = true\n\n[dirs]\n\"b/dist\" = \"b\"\n\"a/dist\" = \"a\"\n\n[env_map]\n\"db.password\" = \"DB_PASSWORD\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.keep_outdated);
        let dirs: Vec<_> = settings.dirs.unwrap().into_iter().collect();
        assert_eq!(
            dirs,
            [
                ("b/dist".to_string(), "b".to_string()),
                ("a/dist".to_string(), "a".to_string()),
            ]
        );
        assert_eq!(
            settings.env_map.unwrap().get("db.password").map(String::as_str),
            Some("DB_PASSWORD")
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILE);
        fs::write(&path, "keep_outdatd = true\n").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, DistconfError::UnknownKeys(_)));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_FILE);
        fs::write(&path, "keep_outdated = \"sometimes\"\n").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, DistconfError::SettingsParse { .. }));
    }

    #[test]
    fn template_documents_every_setting() {
        let template = template();
        for key in ["keep_outdated", "interactive", "dist_marker", "name", "env_map", "dirs"] {
            assert!(template.contains(key), "missing {key}");
        }
        assert!(template.contains("Trailing extension that marks a template file"));
    }
}
