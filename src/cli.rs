//! Clap adapter for distconf.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The only
//! bridge to the core is [`Cli::into_action()`], which turns parsed
//! arguments into an [`Action`](crate::Action); everything after that runs
//! through the clap-free [`DistconfBuilder::handle()`](crate::DistconfBuilder::handle).

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::builder::DistconfBuilder;
use crate::settings::DEFAULT_FILE;
use crate::types::Action;

/// Keep local configuration files in sync with their templates.
#[derive(Debug, Parser)]
#[command(name = "distconf", version)]
pub struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = DEFAULT_FILE)]
    pub settings: PathBuf,

    /// Keep keys that are no longer present in the template.
    #[arg(short, long, global = true)]
    pub keep_outdated: bool,

    /// Never prompt; missing values take the template default.
    #[arg(short = 'n', long, global = true)]
    pub no_interaction: bool,

    /// Base name for environment variable prefixes and prompts.
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Verbose output (-v for debug, -vv for trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile every directory pair listed under [dirs] in the settings.
    Run,
    /// Reconcile one target file against one template.
    File {
        /// Local file to create or update.
        target: PathBuf,
        /// Template file.
        dist: PathBuf,
    },
    /// Reconcile every template in a directory.
    Dir {
        /// Directory receiving the local files.
        target_dir: PathBuf,
        /// Directory holding the templates.
        dist_dir: PathBuf,
    },
    /// Generate a commented settings file.
    Init {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Convert the parsed subcommand into a framework-agnostic `Action`.
    pub fn into_action(self) -> Action {
        match self.command {
            Command::Run => Action::Run,
            Command::File { target, dist } => Action::File { target, dist },
            Command::Dir {
                target_dir,
                dist_dir,
            } => Action::Dir {
                target_dir,
                dist_dir,
            },
            Command::Init { output } => Action::Init { output },
        }
    }

    /// Apply flags that override the settings file. Flags that were not
    /// passed leave the builder alone.
    pub fn apply(&self, mut builder: DistconfBuilder) -> DistconfBuilder {
        if self.keep_outdated {
            builder = builder.keep_outdated(true);
        }
        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        builder
    }
}
