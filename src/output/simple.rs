//! Simple output formatter for scripts
//!
//! One package name per line, nothing else.

use crate::domain::Finding;
use crate::output::OutputFormatter;
use std::io::Write;

/// Formatter printing bare package names
#[derive(Debug, Default)]
pub struct SimpleFormatter;

impl SimpleFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for SimpleFormatter {
    fn format(&self, findings: &[Finding], writer: &mut dyn Write) -> std::io::Result<()> {
        for finding in findings {
            writeln!(writer, "{}", finding.name())?;
        }
        Ok(())
    }
}
