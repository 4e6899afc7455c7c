//! Whole-file encodings.
//!
//! Every variant turns text into a [`Table`] and back. Two rules hold for all
//! of them:
//!
//! - Empty (or whitespace-only) content parses to an empty table, so a target
//!   file that does not exist yet is just `""`.
//! - Dumping the table obtained from content previously produced by `dump`
//!   reproduces that content byte for byte.
//!
//! The variant set is closed. Extensions are mapped to variants by the
//! [`Registry`](crate::registry::Registry).

mod ini;
mod json;
mod php;
mod toml;
#[cfg(feature = "yaml")]
mod yaml;

use std::fmt;

use crate::error::FormatError;
use crate::value::Table;

pub use ini::HEADER as INI_HEADER;
pub use php::HEADER as PHP_HEADER;

/// A supported file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Flat `key=value` lines; nesting becomes dotted keys.
    Ini,
    Json,
    /// Block style down to a fixed depth, flow style below it.
    Yaml,
    Toml,
    /// A PHP script returning an array literal.
    Php,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Ini,
        Format::Json,
        Format::Yaml,
        Format::Toml,
        Format::Php,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Format::Ini => "INI",
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Php => "PHP",
        }
    }

    /// Whether this build can read and write the format.
    pub fn is_supported(self) -> bool {
        match self {
            Format::Yaml => cfg!(feature = "yaml"),
            Format::Ini | Format::Json | Format::Toml | Format::Php => true,
        }
    }

    /// Parse whole-file content into a table.
    pub fn parse(self, content: &str) -> Result<Table, FormatError> {
        if content.trim().is_empty() {
            return Ok(Table::new());
        }
        match self {
            Format::Ini => ini::parse(content),
            Format::Json => json::parse(content),
            Format::Toml => toml::parse(content),
            Format::Php => php::parse(content),
            #[cfg(feature = "yaml")]
            Format::Yaml => yaml::parse(content),
            #[cfg(not(feature = "yaml"))]
            Format::Yaml => Err(FormatError::Unsupported(self)),
        }
    }

    /// Serialize a table into whole-file content.
    pub fn dump(self, table: &Table) -> Result<String, FormatError> {
        match self {
            Format::Ini => ini::dump(table),
            Format::Json => json::dump(table),
            Format::Toml => toml::dump(table),
            Format::Php => php::dump(table),
            #[cfg(feature = "yaml")]
            Format::Yaml => yaml::dump(table),
            #[cfg(not(feature = "yaml"))]
            Format::Yaml => Err(FormatError::Unsupported(self)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
