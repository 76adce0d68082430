//! Dependency sources
//!
//! This module provides:
//! - The choice between the legacy freeze file, the project freeze file and
//!   the package description
//! - Loading the chosen source into an ordered dependency list
//!
//! Exactly one source is read per run.

pub mod condition;
pub mod description;
pub mod finalize;
pub mod freeze;

pub use condition::{Condition, ConditionParseError};
pub use description::{
    find_description, load_description, ComponentKind, ComponentName, FlagDecl,
    GenericDescription,
};
pub use finalize::{finalize, FinalizePolicy, ResolvedDescription};
pub use freeze::{
    find_project_root, load_frozen_config, load_legacy, locate_project, FrozenConstraint,
};

use crate::domain::{CompilerId, Dependency, Platform};
use crate::error::SourceError;
use crate::outdated::OutdatedFlags;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where declared dependencies are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// `cabal.config` in the working directory
    Legacy,
    /// `<project file>.freeze` at the project root
    NewStyle { project_file: Option<PathBuf> },
    /// The package description in the working directory
    Description,
}

/// Inputs needed to read a dependency source
#[derive(Debug)]
pub struct SourceContext<'a> {
    pub working_dir: &'a Path,
    pub compiler: &'a CompilerId,
    pub platform: &'a Platform,
    pub policy: &'a FinalizePolicy,
}

impl DependencySource {
    /// Picks the source; the legacy freeze file wins over the project freeze file
    pub fn select(flags: &OutdatedFlags) -> Self {
        if flags.freeze_file {
            DependencySource::Legacy
        } else if flags.new_freeze_file {
            DependencySource::NewStyle {
                project_file: flags.project_file.clone(),
            }
        } else {
            DependencySource::Description
        }
    }

    /// Reads the declared dependencies, in source order
    pub fn resolve(&self, context: &SourceContext<'_>) -> Result<Vec<Dependency>, SourceError> {
        let dependencies: Vec<Dependency> = match self {
            DependencySource::Legacy => {
                info!("Reading dependencies from {}", freeze::LEGACY_FREEZE_FILE);
                load_legacy(context.working_dir)?
                    .into_iter()
                    .map(FrozenConstraint::into_dependency)
                    .collect()
            }
            DependencySource::NewStyle { project_file } => {
                let (root, marker) =
                    locate_project(context.working_dir, project_file.as_deref())?;
                info!("Reading dependencies from {}.freeze in {}", marker, root.display());
                load_frozen_config(&root, &marker)?
                    .into_iter()
                    .map(FrozenConstraint::into_dependency)
                    .collect()
            }
            DependencySource::Description => {
                let path = find_description(context.working_dir)?;
                info!("Reading dependencies from {}", path.display());
                let generic = load_description(&path)?;
                let resolved = finalize(
                    &generic,
                    context.compiler,
                    context.platform,
                    context.policy,
                )
                .map_err(|source| SourceError::Finalize {
                    path: path.clone(),
                    source,
                })?;
                debug!(
                    "Finalized {} for {} on {}",
                    resolved.name, context.compiler, context.platform
                );
                resolved.dependencies
            }
        };

        debug!("Found {} declared dependency(ies)", dependencies.len());
        Ok(dependencies)
    }
}
