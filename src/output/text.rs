//! Text output formatter for human-readable display
//!
//! Prints a header followed by one line per finding, naming the dependency
//! with its declared range and the latest available version.

use crate::domain::Finding;
use crate::output::OutputFormatter;
use colored::Colorize;
use std::io::Write;

const HEADER: &str = "Outdated dependencies:";
const UP_TO_DATE: &str = "All dependencies are up to date.";

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Create a new text formatter with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn format_finding(&self, finding: &Finding, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            let range = if finding.dependency.range.is_any() {
                String::new()
            } else {
                format!(" {}", finding.dependency.range.to_string().dimmed())
            };
            writeln!(
                writer,
                "{}{} (latest: {})",
                finding.name().bold(),
                range,
                finding.latest.to_string().green()
            )
        } else {
            writeln!(writer, "{}", finding)
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, findings: &[Finding], writer: &mut dyn Write) -> std::io::Result<()> {
        if findings.is_empty() {
            if self.color {
                writeln!(writer, "{}", UP_TO_DATE.green())?;
            } else {
                writeln!(writer, "{}", UP_TO_DATE)?;
            }
            return Ok(());
        }

        if self.color {
            writeln!(writer, "{}", HEADER.bold())?;
        } else {
            writeln!(writer, "{}", HEADER)?;
        }
        for finding in findings {
            self.format_finding(finding, writer)?;
        }
        Ok(())
    }
}
