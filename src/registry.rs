//! Extension-to-format mapping.

use indexmap::IndexMap;

use crate::format::Format;

/// Maps lowercase file extensions (without the dot) to formats.
///
/// An empty registry is valid to build but rejected by directory
/// reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    formats: IndexMap<String, Format>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ini`, `json`, `yml`, `yaml`, `toml` and `php`, minus whatever this
    /// build cannot handle.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (extension, format) in [
            ("ini", Format::Ini),
            ("json", Format::Json),
            ("yml", Format::Yaml),
            ("yaml", Format::Yaml),
            ("toml", Format::Toml),
            ("php", Format::Php),
        ] {
            registry.register(extension, format);
        }
        registry
    }

    /// Associate `extension` with `format`, replacing any earlier mapping.
    ///
    /// Returns `false` (and registers nothing) when the format is not
    /// compiled in.
    pub fn register(&mut self, extension: &str, format: Format) -> bool {
        if !format.is_supported() {
            tracing::debug!(extension, format = %format, "Format not compiled in, skipping");
            return false;
        }
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.formats.insert(extension, format);
        true
    }

    pub fn get(&self, extension: &str) -> Option<Format> {
        self.formats.get(&extension.to_ascii_lowercase()).copied()
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.get(extension).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}
