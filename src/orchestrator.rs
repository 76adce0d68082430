//! Outdated command orchestrator
//!
//! This module provides the workflow of one run:
//! select source → read dependencies → analyze → report → exit status

use crate::domain::{CompilerId, Finding, Platform};
use crate::error::AppError;
use crate::index::PackageIndex;
use crate::outdated::{list_outdated, OutdatedFlags};
use crate::output::{exit_status, report, OutdatedStatus, OutputConfig, Verbosity};
use crate::source::{DependencySource, FinalizePolicy, SourceContext};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Orchestrator for a single outdated run
#[derive(Debug)]
pub struct OutdatedCommand {
    verbosity: Verbosity,
    flags: OutdatedFlags,
    compiler: CompilerId,
    platform: Platform,
    working_dir: PathBuf,
    policy: FinalizePolicy,
    color: bool,
}

impl OutdatedCommand {
    /// Create a command that finalizes package descriptions maximally
    pub fn new(
        verbosity: Verbosity,
        flags: OutdatedFlags,
        compiler: CompilerId,
        platform: Platform,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            verbosity,
            flags,
            compiler,
            platform,
            working_dir: working_dir.into(),
            policy: FinalizePolicy::maximal(),
            color: false,
        }
    }

    /// Replace the finalization policy
    pub fn with_policy(mut self, policy: FinalizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable colored text output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Reads the dependencies and lists the outdated ones without printing
    pub fn findings(&self, index: &dyn PackageIndex) -> Result<Vec<Finding>, AppError> {
        let source = DependencySource::select(&self.flags);
        let context = SourceContext {
            working_dir: &self.working_dir,
            compiler: &self.compiler,
            platform: &self.platform,
            policy: &self.policy,
        };
        let dependencies = source.resolve(&context)?;

        let findings = list_outdated(&dependencies, index, &self.flags.settings());
        info!(
            "{} of {} dependency(ies) outdated",
            findings.len(),
            dependencies.len()
        );
        Ok(findings)
    }

    /// Run the whole workflow, writing the report to `writer`
    pub fn run(
        &self,
        index: &dyn PackageIndex,
        writer: &mut dyn Write,
    ) -> Result<OutdatedStatus, AppError> {
        let findings = self.findings(index)?;

        let config = OutputConfig::from_flags(&self.flags, self.verbosity).with_color(self.color);
        report(&findings, &config, writer)?;

        Ok(exit_status(&findings, self.flags.exit_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;
    use crate::index::InMemoryIndex;
    use crate::outdated::MinorRelax;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn versions(list: &[&str]) -> Vec<Version> {
        list.iter().map(|v| v.parse().unwrap()).collect()
    }

    fn index() -> InMemoryIndex {
        InMemoryIndex::new()
            .with_package("base", versions(&["4.18.2.1", "4.19.1.0"]))
            .with_package("text", versions(&["2.0.2", "2.1.1"]))
            .with_package("aeson", versions(&["2.1.2.1", "2.2.3.0"]))
    }

    fn legacy_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cabal.config"),
            "constraints: any.base ==4.18.2.1,\n  any.text ==2.1.1,\n  any.aeson ==2.1.2.1\n",
        )
        .unwrap();
        dir
    }

    fn command(dir: &Path, flags: OutdatedFlags) -> OutdatedCommand {
        OutdatedCommand::new(
            Verbosity::Normal,
            flags,
            "ghc-9.6.6".parse().unwrap(),
            Platform::new("linux", "x86_64"),
            dir,
        )
    }

    fn run(command: &OutdatedCommand) -> (OutdatedStatus, String) {
        let mut output = Vec::new();
        let status = command.run(&index(), &mut output).unwrap();
        (status, String::from_utf8(output).unwrap())
    }

    fn legacy_flags() -> OutdatedFlags {
        OutdatedFlags {
            freeze_file: true,
            ..OutdatedFlags::default()
        }
    }

    #[test]
    fn test_run_text_output() {
        let dir = legacy_project();
        let (status, output) = run(&command(dir.path(), legacy_flags()));

        assert_eq!(status, OutdatedStatus::Success);
        assert_eq!(
            output,
            "Outdated dependencies:\nbase ==4.18.2.1 (latest: 4.19.1.0)\naeson ==2.1.2.1 (latest: 2.2.3.0)\n"
        );
    }

    #[test]
    fn test_run_simple_output() {
        let dir = legacy_project();
        let flags = OutdatedFlags {
            simple_output: true,
            ..legacy_flags()
        };
        let (_, output) = run(&command(dir.path(), flags));
        assert_eq!(output, "base\naeson\n");
    }

    #[test]
    fn test_run_quiet_fails_without_output() {
        let dir = legacy_project();
        let flags = OutdatedFlags {
            quiet: true,
            ..legacy_flags()
        };
        let (status, output) = run(&command(dir.path(), flags));
        assert_eq!(status, OutdatedStatus::OutdatedFound);
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_quiet_without_exit_code() {
        let dir = legacy_project();
        let flags = OutdatedFlags {
            quiet: true,
            exit_code: Some(false),
            ..legacy_flags()
        };
        let (status, output) = run(&command(dir.path(), flags));
        assert_eq!(status, OutdatedStatus::Success);
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_ignore_and_minor() {
        let dir = legacy_project();
        let flags = OutdatedFlags {
            ignore: vec!["aeson".to_string()],
            minor: MinorRelax::All,
            exit_code: Some(true),
            ..legacy_flags()
        };
        let (status, output) = run(&command(dir.path(), flags));
        // base ==4.18.2.1 relaxes to >=4.18.2.1 && <4.19
        assert_eq!(status, OutdatedStatus::Success);
        assert_eq!(output, "All dependencies are up to date.\n");
    }

    #[test]
    fn test_run_silent_verbosity() {
        let dir = legacy_project();
        let command = OutdatedCommand::new(
            Verbosity::Silent,
            legacy_flags(),
            "ghc-9.6.6".parse().unwrap(),
            Platform::new("linux", "x86_64"),
            dir.path(),
        );
        let (_, output) = run(&command);
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let mut output = Vec::new();
        let result = command(dir.path(), legacy_flags()).run(&index(), &mut output);
        assert!(matches!(result, Err(AppError::Source(_))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_description_with_default_policy() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("demo.cabal"),
            "name: demo\nlibrary\n  build-depends: text ==2.0.2\ntest-suite t\n  build-depends: base ==4.18.2.1\n",
        )
        .unwrap();

        let maximal = command(dir.path(), OutdatedFlags::default());
        let findings = maximal.findings(&index()).unwrap();
        assert_eq!(findings.len(), 2);

        let defaults = maximal.with_policy(FinalizePolicy::defaults());
        let findings = defaults.findings(&index()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name(), "text");
    }
}
