//! Core domain models for cabal-outdated
//!
//! This module contains the fundamental types used throughout the application:
//! - Versions and version range predicates
//! - Canonical interval decomposition and minor relaxation
//! - Dependency and finding structures
//! - Compiler and platform identities used by finalization

mod dependency;
mod finding;
mod intervals;
mod platform;
mod version;
mod version_range;

pub use dependency::Dependency;
pub use finding::Finding;
pub use intervals::{relax_minor, Bound, Interval, LowerBound, UpperBound, VersionIntervals};
pub use platform::{CompilerId, Platform, PlatformParseError};
pub use version::{Version, VersionParseError};
pub use version_range::{RangeParseError, VersionRange};
