use std::path::PathBuf;

use thiserror::Error;

use crate::format::Format;

#[derive(Debug, Error)]
pub enum DistconfError {
    #[error("{0} is missing")]
    MissingTemplate(PathBuf),

    #[error("No parser associated to extension \"{extension}\" ({path})")]
    UnregisteredFormat { extension: String, path: PathBuf },

    #[error("No parser loaded")]
    NoParsers,

    #[error("Failed to parse {path}: {source}")]
    ParseError { path: PathBuf, source: FormatError },

    #[error("Failed to serialize {path}: {source}")]
    DumpError { path: PathBuf, source: FormatError },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read a value for '{key}': {source}")]
    Prompt {
        key: String,
        source: std::io::Error,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in settings file")]
    UnknownKeys(Vec<DistconfError>),

    #[error("Failed to parse settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("No directories configured; add a [dirs] table to the settings file")]
    NoDirectories,
}

/// Why a single document could not be read or written in a given format.
///
/// Carries no file identity; [`DistconfError::ParseError`] and
/// [`DistconfError::DumpError`] attach the path.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("cannot write TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("line {line}: {reason}")]
    Ini { line: usize, reason: String },

    #[error("offset {offset}: {reason}")]
    Php { offset: usize, reason: String },

    #[error("document holds a {found}, expected a mapping")]
    NotAMapping { found: &'static str },

    #[error("'{key}' cannot be written as {format}: {reason}")]
    Unrepresentable {
        key: String,
        format: Format,
        reason: String,
    },

    #[error("{0} support is not compiled in")]
    Unsupported(Format),
}
