//! Outdated dependency detection
//!
//! This module provides:
//! - Settings for ignored and minor-relaxed packages
//! - The flags of one outdated run
//! - The per-package policy rule
//! - The comparison that decides whether a dependency is outdated
//!
//! The analysis is a pure function of the dependency list, the package index
//! and the settings. It performs no I/O.

mod flags;
mod settings;

pub use flags::OutdatedFlags;
pub use settings::{ListOutdatedSettings, MinorRelax, PackagePolicy};

use crate::domain::{relax_minor, Dependency, Finding, VersionRange};
use crate::index::PackageIndex;
use tracing::debug;

/// Lists dependencies that have a newer version available
///
/// Findings keep the input order. Dependencies on the same package are
/// analyzed independently, so duplicates in the input can produce duplicate
/// findings.
pub fn list_outdated(
    dependencies: &[Dependency],
    index: &dyn PackageIndex,
    settings: &ListOutdatedSettings,
) -> Vec<Finding> {
    dependencies
        .iter()
        .map(Dependency::simplify)
        .filter_map(|dependency| check_dependency(dependency, index, settings))
        .collect()
}

/// Decides whether a single (simplified) dependency is outdated
pub fn check_dependency(
    dependency: Dependency,
    index: &dyn PackageIndex,
    settings: &ListOutdatedSettings,
) -> Option<Finding> {
    let policy = settings.policy_for(&dependency.name);
    let target = match policy {
        PackagePolicy::Ignore => {
            debug!(package = %dependency.name, "ignored");
            return None;
        }
        PackagePolicy::RelaxMinor => relax_minor(&dependency.range),
        PackagePolicy::Unconstrained => VersionRange::Any,
    };

    let current = index.versions_matching(&dependency.name, &dependency.range);
    let latest = index.versions_matching(&dependency.name, &target);

    let (Some(current_max), Some(latest_max)) = (current.last(), latest.last()) else {
        debug!(
            package = %dependency.name,
            current = current.len(),
            latest = latest.len(),
            "no version data, skipping"
        );
        return None;
    };

    if current_max < latest_max {
        debug!(package = %dependency.name, current = %current_max, latest = %latest_max, "outdated");
        let latest_max = latest_max.clone();
        Some(Finding::new(dependency, latest_max))
    } else {
        debug!(package = %dependency.name, current = %current_max, "up to date");
        None
    }
}
