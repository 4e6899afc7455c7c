//! Keep local configuration files in sync with the templates shipped next to
//! them.
//!
//! A project ships `config/parameters.yml.dist` listing every key it expects
//! along with a default value. Each checkout keeps its own
//! `config/parameters.yml` with live values. Distconf reconciles the two:
//!
//! ```ignore
//! let mut reconciler = Distconf::builder().build();
//! reconciler.reconcile_file(
//!     Path::new("config/parameters.yml"),
//!     Path::new("config/parameters.yml.dist"),
//! )?;
//! ```
//!
//! - keys the template lists but the local file lacks are added;
//! - local values are never overwritten;
//! - keys the template no longer lists are dropped (unless
//!   [`keep_outdated`](DistconfBuilder::keep_outdated) is set);
//! - the file is only written when its content actually changes, so a second
//!   run leaves it byte for byte (and mtime) untouched.
//!
//! # Filling in missing values
//!
//! A missing leaf at `parameters.db.host` in `app.yml` is looked up in the
//! environment as `APP_PARAMETERS_DB_HOST`: base name, then the
//! dotted path, uppercased with dots turned into underscores. The base name
//! is the target file stem unless [`name()`](DistconfBuilder::name) fixes it.
//! [`env_map()`](DistconfBuilder::env_map) replaces the derived names with
//! an explicit list, and [`no_env()`](DistconfBuilder::no_env) turns lookup
//! off.
//!
//! Values that the environment does not provide are asked for through a
//! [`Prompt`] when one is configured, with the template default offered. A
//! leaf already settled by the environment is not asked for. Without a
//! prompt the template default is used as is.
//!
//! Environment values and answers are read as JSON when they parse as JSON
//! scalars or lists (`8080` is an integer, `"8080"` a string, `true` a
//! boolean) and as plain strings otherwise.
//!
//! # Formats
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `ini` | flat `key=value`, nested keys dotted |
//! | `json` | pretty printed |
//! | `yml`, `yaml` | block style, flow style below depth 3 (`yaml` feature) |
//! | `toml` | no null values |
//! | `php` | `return array (...);` in `var_export` layout |
//!
//! Template and target may differ in format. In a directory run,
//! `app.ini.json` is read as JSON and reconciled into `app.ini`.
//!
//! # Directory runs
//!
//! [`Reconciler::reconcile_dir`] processes every template in a directory,
//! stripping the distribution marker (`dist` by default) to get the target
//! name. A template that fails is logged, recorded in the [`DirReport`], and
//! skipped; the rest of the batch still runs.
//!
//! # Command line
//!
//! The `distconf` binary (behind the default `clap` feature) reads
//! `distconf.toml` for its settings, see [`Settings`]:
//!
//! ```text
//! distconf run                         # every [dirs] pair
//! distconf file config/app.yml config/app.yml.dist
//! distconf dir config config/dist
//! distconf init -o distconf.toml       # commented settings template
//! ```

pub mod error;
pub mod format;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod codec;
mod env;
pub mod merge;
mod ops;
mod prompt;
mod reconcile;
mod registry;
mod settings;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Distconf, DistconfBuilder};
#[cfg(feature = "clap")]
pub use cli::{Cli, Command};
pub use codec::{decode, encode};
pub use env::EnvVars;
pub use error::{DistconfError, FormatError};
pub use format::Format;
pub use ops::ActionResult;
pub use prompt::{Prompt, TerminalPrompt};
pub use reconcile::Reconciler;
pub use registry::Registry;
pub use settings::Settings;
pub use types::{Action, DirReport, EnvMapping, FileOutcome};
pub use value::{Table, Value, get_path};
