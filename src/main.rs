use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use distconf::{Cli, Distconf, DistconfError, Settings, TerminalPrompt};

fn setup_tracing(verbose: u8) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .init();
}

fn report(err: &DistconfError) {
    eprintln!("Error: {err}");
    if let DistconfError::UnknownKeys(keys) = err {
        for key in keys {
            eprintln!("  {key}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let settings = match Settings::load(&cli.settings) {
        Ok(settings) => settings,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let mut builder = cli.apply(Distconf::builder().settings(&settings));
    if settings.interactive && !cli.no_interaction && std::io::stdin().is_terminal() {
        builder = builder.prompt(TerminalPrompt::stdio());
    }

    match builder.handle_and_print(&cli.into_action()) {
        Ok(result) if result.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
