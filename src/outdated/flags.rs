//! Options recognized by the outdated command

use super::{ListOutdatedSettings, MinorRelax};
use std::path::PathBuf;

/// Flags of one outdated run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutdatedFlags {
    /// Read constraints from the legacy `cabal.config`
    pub freeze_file: bool,
    /// Read constraints from the project's `.freeze` file
    pub new_freeze_file: bool,
    /// Print package names only
    pub simple_output: bool,
    /// Print nothing
    pub quiet: bool,
    /// Fail when something is outdated; follows `quiet` when unset
    pub exit_code: Option<bool>,
    /// Packages never reported
    pub ignore: Vec<String>,
    /// Packages whose latest version stays on the current major line
    pub minor: MinorRelax,
    /// Project file used to locate the project root (`cabal.project` if unset)
    pub project_file: Option<PathBuf>,
}

impl OutdatedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective exit-code setting
    pub fn exit_code(&self) -> bool {
        self.exit_code.unwrap_or(self.quiet)
    }

    /// Settings handed to the analyzer
    pub fn settings(&self) -> ListOutdatedSettings {
        ListOutdatedSettings::new()
            .with_ignore(self.ignore.iter().cloned())
            .with_minor(self.minor.clone())
    }
}
