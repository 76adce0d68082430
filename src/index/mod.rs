//! Package index access
//!
//! This module provides:
//! - The read-only query surface the analyzer uses
//! - An in-memory index keyed by package name
//! - A JSON catalog loader

mod loader;

pub use loader::{load_index, IndexFile};

use crate::domain::{Version, VersionRange};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only lookups over published package versions
pub trait PackageIndex {
    /// All published versions of `name` (empty if the package is unknown)
    fn versions_of(&self, name: &str) -> BTreeSet<Version>;

    /// Published versions of `name` that satisfy `range`
    fn versions_matching(&self, name: &str, range: &VersionRange) -> BTreeSet<Version> {
        self.versions_of(name)
            .into_iter()
            .filter(|v| range.contains(v))
            .collect()
    }
}

/// Package index held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryIndex {
    packages: BTreeMap<String, BTreeSet<Version>>,
}

impl InMemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add published versions for a package (builder pattern)
    pub fn with_package<I>(mut self, name: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = Version>,
    {
        self.insert(name, versions);
        self
    }

    /// Add published versions for a package
    pub fn insert<I>(&mut self, name: impl Into<String>, versions: I)
    where
        I: IntoIterator<Item = Version>,
    {
        self.packages.entry(name.into()).or_default().extend(versions);
    }

    /// Number of packages in the index
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageIndex for InMemoryIndex {
    fn versions_of(&self, name: &str) -> BTreeSet<Version> {
        self.packages.get(name).cloned().unwrap_or_default()
    }

    fn versions_matching(&self, name: &str, range: &VersionRange) -> BTreeSet<Version> {
        self.packages
            .get(name)
            .map(|versions| {
                versions
                    .iter()
                    .filter(|v| range.contains(v))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
