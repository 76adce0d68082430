//! Outdated listing settings
//!
//! This module provides the ListOutdatedSettings struct that encapsulates
//! the ignore and minor-relaxation options, and the per-package policy rule
//! derived from them.

use std::collections::BTreeSet;

/// Which packages have their "latest" lookup limited to the current major line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MinorRelax {
    /// No package is relaxed
    #[default]
    None,
    /// Every package is relaxed
    All,
    /// Only the named packages are relaxed
    Only(BTreeSet<String>),
}

impl MinorRelax {
    /// Build from a list of names; an empty list relaxes nothing
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            MinorRelax::None
        } else {
            MinorRelax::Only(names)
        }
    }

    /// Check if a package is relaxed
    pub fn contains(&self, name: &str) -> bool {
        match self {
            MinorRelax::None => false,
            MinorRelax::All => true,
            MinorRelax::Only(names) => names.contains(name),
        }
    }
}

/// How a single package is treated by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePolicy {
    /// Dropped before any index lookup
    Ignore,
    /// "Latest" is looked up within the relaxed range
    RelaxMinor,
    /// "Latest" is the newest published version
    Unconstrained,
}

/// Settings for outdated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOutdatedSettings {
    /// Packages never reported
    pub ignore: BTreeSet<String>,
    /// Packages whose latest version is looked up within their major line
    pub minor: MinorRelax,
}

impl ListOutdatedSettings {
    /// Create settings that ignore nothing and relax nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set packages to ignore
    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set minor relaxation
    pub fn with_minor(mut self, minor: MinorRelax) -> Self {
        self.minor = minor;
        self
    }

    /// Decide how a package is treated; ignore takes precedence over relaxation
    pub fn policy_for(&self, name: &str) -> PackagePolicy {
        if self.ignore.contains(name) {
            PackagePolicy::Ignore
        } else if self.minor.contains(name) {
            PackagePolicy::RelaxMinor
        } else {
            PackagePolicy::Unconstrained
        }
    }
}
