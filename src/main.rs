//! cabal-outdated - Report dependencies with newer versions available
//!
//! Reads declared dependencies from a freeze file or the package
//! description and compares them against a package index.

use cabal_outdated::cli::CliArgs;
use cabal_outdated::error::ConfigError;
use cabal_outdated::index::load_index;
use cabal_outdated::logging::init_tracing;
use cabal_outdated::orchestrator::OutdatedCommand;
use cabal_outdated::output::OutdatedStatus;
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Run the main logic and handle errors
    match run(args) {
        Ok(OutdatedStatus::Success) => ExitCode::SUCCESS,
        Ok(OutdatedStatus::OutdatedFound) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<OutdatedStatus> {
    let verbosity = args.verbosity();
    init_tracing(verbosity)?;

    info!("cabal-outdated v{}", env!("CARGO_PKG_VERSION"));
    info!("Target: {}", args.path.display());

    if !args.path.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: args.path.clone(),
            message: "not a directory".to_string(),
        }
        .into());
    }

    let flags = args.to_flags()?;
    let index = load_index(&args.index)?;
    info!("Loaded {} package(s) from the index", index.len());

    let platform = args.platform();
    info!("Finalizing for {} on {}", args.compiler, platform);

    let command = OutdatedCommand::new(
        verbosity,
        flags,
        args.compiler.clone(),
        platform,
        args.path.clone(),
    )
    .with_color(io::stdout().is_terminal());

    let mut stdout = io::stdout().lock();
    let status = command.run(&index, &mut stdout)?;
    stdout.flush()?;

    Ok(status)
}
