//! CLI argument parsing module for cabal-outdated

use crate::domain::{CompilerId, Platform};
use crate::error::ConfigError;
use crate::outdated::{MinorRelax, OutdatedFlags};
use crate::output::Verbosity;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Value of `--minor` given without package names
const ALL_PACKAGES: &str = "*";

/// Parse a verbosity level: 0-3 or silent/normal/verbose/deafening
fn parse_verbosity(s: &str) -> Result<Verbosity, String> {
    s.parse()
}

/// Parse a compiler identity such as `ghc-9.6.6`
fn parse_compiler(s: &str) -> Result<CompilerId, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Report dependencies with newer versions available
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cabal-outdated",
    version,
    about = "Report dependencies with newer versions available"
)]
pub struct CliArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Dependency source
    /// Read dependencies from the legacy freeze file (cabal.config)
    #[arg(long)]
    pub freeze_file: bool,

    /// Read dependencies from the project freeze file (cabal.project.freeze)
    #[arg(long = "v2-freeze-file", visible_alias = "new-freeze-file")]
    pub new_freeze_file: bool,

    /// Project file used to locate the project root
    #[arg(long, value_name = "FILE")]
    pub project_file: Option<PathBuf>,

    // Package index and finalization
    /// Package index (JSON: {"packages": {"name": ["1.0", ...]}})
    #[arg(long, value_name = "FILE")]
    pub index: PathBuf,

    /// Compiler used to finalize the package description
    #[arg(long, value_name = "ID", default_value = "ghc-9.6.6", value_parser = parse_compiler)]
    pub compiler: CompilerId,

    /// Operating system used to finalize the package description (default: host)
    #[arg(long)]
    pub os: Option<String>,

    /// Architecture used to finalize the package description (default: host)
    #[arg(long)]
    pub arch: Option<String>,

    // Package filters
    /// Do not report these packages (comma-separated, can be repeated)
    #[arg(long, value_name = "PKGS", action = ArgAction::Append, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Look for newer versions on the current major line only; all packages if no list is given.
    /// A package list must be attached with '=' (--minor=PKGS); a separate word is read as PATH
    #[arg(
        long,
        value_name = "PKGS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ALL_PACKAGES,
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    pub minor: Vec<String>,

    // Output options
    /// Print only the names of outdated packages
    #[arg(long)]
    pub simple_output: bool,

    /// Print nothing; implies --exit-code unless --no-exit-code is given
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with failure when outdated dependencies are found
    #[arg(long, overrides_with = "no_exit_code")]
    pub exit_code: bool,

    /// Always exit with success when the check itself succeeds
    #[arg(long, overrides_with = "exit_code")]
    pub no_exit_code: bool,

    /// Verbosity: 0-3 or silent/normal/verbose/deafening
    #[arg(short, long, value_name = "LEVEL", default_value = "normal", value_parser = parse_verbosity)]
    pub verbose: Verbosity,
}

impl CliArgs {
    /// Explicit --exit-code / --no-exit-code, the last one winning
    pub fn exit_code_setting(&self) -> Option<bool> {
        if self.exit_code {
            Some(true)
        } else if self.no_exit_code {
            Some(false)
        } else {
            None
        }
    }

    /// Platform to finalize for, defaulting to the host
    pub fn platform(&self) -> Platform {
        let host = Platform::host();
        Platform::new(
            self.os.as_deref().unwrap_or(&host.os),
            self.arch.as_deref().unwrap_or(&host.arch),
        )
    }

    /// Effective verbosity; `--quiet` silences everything
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Silent
        } else {
            self.verbose
        }
    }

    /// Build the flags of the outdated command
    pub fn to_flags(&self) -> Result<OutdatedFlags, ConfigError> {
        let ignore = validate_names(&self.ignore)?;

        let minor = if self.minor.iter().any(|m| m.trim() == ALL_PACKAGES) {
            MinorRelax::All
        } else {
            MinorRelax::only(validate_names(&self.minor)?)
        };

        Ok(OutdatedFlags {
            freeze_file: self.freeze_file,
            new_freeze_file: self.new_freeze_file,
            simple_output: self.simple_output,
            quiet: self.quiet,
            exit_code: self.exit_code_setting(),
            ignore,
            minor,
            project_file: self.project_file.clone(),
        })
    }
}

/// Trims names, drops empty entries and rejects invalid package names
fn validate_names(values: &[String]) -> Result<Vec<String>, ConfigError> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| {
            if is_package_name(v) {
                Ok(v.to_string())
            } else {
                Err(ConfigError::InvalidPackageName {
                    value: v.to_string(),
                })
            }
        })
        .collect()
}

/// Package names are dash-separated alphanumeric words, each with a letter
fn is_package_name(name: &str) -> bool {
    name.split('-').all(|word| {
        !word.is_empty()
            && word.chars().all(|c| c.is_ascii_alphanumeric())
            && word.chars().any(|c| c.is_ascii_alphabetic())
    })
}
