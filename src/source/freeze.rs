//! Frozen configuration files
//!
//! Handles:
//! - Legacy `cabal.config` in the working directory
//! - New-style `cabal.project.freeze` next to the project file
//! - `constraints:` fields spanning continuation lines
//! - Qualified constraints (`any.text ==2.0.2`, `setup.Cabal ==3.10.1.0`)
//! - Non-version constraints (`installed`, `source`, `+flag -flag`), which are skipped

use crate::domain::{Dependency, RangeParseError, VersionRange};
use crate::error::SourceError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};

/// File name of the legacy frozen configuration
pub const LEGACY_FREEZE_FILE: &str = "cabal.config";

/// Default project marker for new-style projects
pub const DEFAULT_PROJECT_FILE: &str = "cabal.project";

// Regex for a top-level field: `name: value`
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:(.*)$").unwrap());

// Regex for a single constraint: `[qualifier.]name property`
static CONSTRAINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.:-]+)\s*(.*)$").unwrap());

// Regex for flag properties: `+dev -cffi`
static FLAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-][A-Za-z0-9_][A-Za-z0-9_-]*\s*)+$").unwrap());

/// A version constraint recorded by a previous solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenConstraint {
    /// Scope qualifier such as `any` or `setup`
    pub qualifier: Option<String>,
    /// Package name
    pub name: String,
    /// Constrained versions
    pub range: VersionRange,
}

impl FrozenConstraint {
    /// Drops the qualifier
    pub fn into_dependency(self) -> Dependency {
        Dependency::new(self.name, self.range)
    }
}

/// Extracts the version constraints from a frozen configuration
///
/// `path` is only used for error messages.
pub fn parse_constraints(
    content: &str,
    path: &Path,
) -> Result<Vec<FrozenConstraint>, SourceError> {
    let mut constraints = Vec::new();
    for value in constraint_fields(content) {
        for raw in value.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if let Some(constraint) = parse_constraint(raw, path)? {
                constraints.push(constraint);
            }
        }
    }
    Ok(constraints)
}

/// Collects the values of every `constraints:` field, continuation lines included
fn constraint_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        if indented {
            if let Some(ref mut value) = current {
                value.push(' ');
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(value) = current.take() {
            fields.push(value);
        }
        if let Some(caps) = FIELD_RE.captures(trimmed) {
            if caps[1].eq_ignore_ascii_case("constraints") {
                current = Some(caps[2].trim().to_string());
            }
        }
    }
    if let Some(value) = current {
        fields.push(value);
    }
    fields
}

fn parse_constraint(raw: &str, path: &Path) -> Result<Option<FrozenConstraint>, SourceError> {
    let caps = CONSTRAINT_RE
        .captures(raw)
        .ok_or_else(|| SourceError::invalid_constraint(path, raw, "expected a package name"))?;
    let target = &caps[1];
    let property = caps[2].trim();

    let (qualifier, name) = match target.rsplit_once('.') {
        Some((qualifier, name)) => (Some(qualifier.to_string()), name.to_string()),
        None => (None, target.to_string()),
    };
    if name.is_empty() {
        return Err(SourceError::invalid_constraint(path, raw, "missing package name"));
    }

    if property.is_empty() {
        return Err(SourceError::invalid_constraint(path, raw, "missing property"));
    }
    let is_range_constant = property == "-any" || property == "-none";
    let is_flags = !is_range_constant && FLAGS_RE.is_match(property);
    if property == "installed" || property == "source" || is_flags {
        trace!(constraint = raw, "skipping non-version constraint");
        return Ok(None);
    }

    let range: VersionRange = property
        .parse()
        .map_err(|e: RangeParseError| SourceError::invalid_constraint(path, raw, e.message))?;

    Ok(Some(FrozenConstraint {
        qualifier,
        name,
        range,
    }))
}

fn read_freeze_file(path: &Path) -> Result<String, SourceError> {
    if !path.is_file() {
        return Err(SourceError::FreezeFileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| SourceError::read_error(path, e))
}

/// Loads the constraints saved in the legacy `cabal.config` of `working_dir`
pub fn load_legacy(working_dir: &Path) -> Result<Vec<FrozenConstraint>, SourceError> {
    let path = working_dir.join(LEGACY_FREEZE_FILE);
    let content = read_freeze_file(&path)?;
    let constraints = parse_constraints(&content, &path)?;
    debug!(path = %path.display(), count = constraints.len(), "loaded legacy freeze file");
    Ok(constraints)
}

/// Finds the closest directory at or above `start` that contains `marker`
pub fn find_project_root(start: &Path, marker: &str) -> Result<PathBuf, SourceError> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| SourceError::ProjectRootNotFound {
            start: start.to_path_buf(),
            marker: marker.to_string(),
        })
}

/// Resolves the project root and project file name
///
/// A bare file name is searched for upwards from `working_dir`; a path with a
/// directory part names the project file directly.
pub fn locate_project(
    working_dir: &Path,
    project_file: Option<&Path>,
) -> Result<(PathBuf, String), SourceError> {
    let project_file = project_file.unwrap_or(Path::new(DEFAULT_PROJECT_FILE));
    let marker = project_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SourceError::ProjectRootNotFound {
            start: working_dir.to_path_buf(),
            marker: project_file.display().to_string(),
        })?;

    let has_directory = project_file
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());
    if !has_directory {
        let root = find_project_root(working_dir, &marker)?;
        return Ok((root, marker));
    }

    let full = working_dir.join(project_file);
    match full.parent() {
        Some(root) if full.is_file() => Ok((root.to_path_buf(), marker)),
        _ => Err(SourceError::ProjectRootNotFound {
            start: working_dir.to_path_buf(),
            marker: project_file.display().to_string(),
        }),
    }
}

/// Loads the constraints of `<root>/<project file>.freeze`
pub fn load_frozen_config(
    root: &Path,
    project_file: &str,
) -> Result<Vec<FrozenConstraint>, SourceError> {
    let path = root.join(format!("{}.freeze", project_file));
    let content = read_freeze_file(&path)?;
    let constraints = parse_constraints(&content, &path)?;
    debug!(path = %path.display(), count = constraints.len(), "loaded project freeze file");
    Ok(constraints)
}
