//! Output formatting for outdated findings
//!
//! This module provides:
//! - Text output listing each finding with its latest version
//! - Simple output with bare package names for scripts
//! - Verbosity handling (quiet runs print nothing)
//! - The exit status decision

mod simple;
mod text;

pub use simple::SimpleFormatter;
pub use text::TextFormatter;

use crate::domain::Finding;
use crate::outdated::OutdatedFlags;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Header plus one line per finding
    #[default]
    Text,
    /// Package names only
    Simple,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output
    Silent,
    /// Normal output
    #[default]
    Normal,
    /// Progress information on stderr
    Verbose,
    /// Everything, including per-package decisions
    Deafening,
}

impl Verbosity {
    /// Map a numeric level (0-3) to a verbosity
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Verbosity::Silent),
            1 => Some(Verbosity::Normal),
            2 => Some(Verbosity::Verbose),
            3 => Some(Verbosity::Deafening),
            _ => None,
        }
    }

    /// Whether the report is printed at this level
    pub fn prints_report(&self) -> bool {
        *self >= Verbosity::Normal
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(level) = s.parse::<u8>() {
            return Verbosity::from_level(level)
                .ok_or_else(|| format!("verbosity level must be 0-3, got {}", level));
        }
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(Verbosity::Silent),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            "deafening" => Ok(Verbosity::Deafening),
            _ => Err(format!("invalid verbosity: {}", s)),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Silent => "silent",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::Deafening => "deafening",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, simple)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(format: OutputFormat, verbosity: Verbosity) -> Self {
        Self {
            format,
            verbosity,
            color: true,
        }
    }

    /// Create configuration from the command flags; `quiet` forces silence
    pub fn from_flags(flags: &OutdatedFlags, verbosity: Verbosity) -> Self {
        let format = if flags.simple_output {
            OutputFormat::Simple
        } else {
            OutputFormat::Text
        };
        let verbosity = if flags.quiet {
            Verbosity::Silent
        } else {
            verbosity
        };
        Self::new(format, verbosity)
    }

    /// Set color usage
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the findings of one run
    fn format(&self, findings: &[Finding], writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.color)),
        OutputFormat::Simple => Box::new(SimpleFormatter::new()),
    }
}

/// Writes the findings unless the configuration is silent
pub fn report(
    findings: &[Finding],
    config: &OutputConfig,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    if !config.verbosity.prints_report() {
        return Ok(());
    }
    create_formatter(config).format(findings, writer)
}

/// Final status of an outdated run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutdatedStatus {
    /// Nothing to report, or reporting does not affect the status
    Success,
    /// Outdated dependencies were found and the exit code was requested
    OutdatedFound,
}

impl OutdatedStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutdatedStatus::Success)
    }
}

/// Decides the status; printing (or not) never influences it
pub fn exit_status(findings: &[Finding], exit_code: bool) -> OutdatedStatus {
    if exit_code && !findings.is_empty() {
        OutdatedStatus::OutdatedFound
    } else {
        OutdatedStatus::Success
    }
}
