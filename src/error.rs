//! Application error types using thiserror
//!
//! Error hierarchy:
//! - SourceError: Locating or reading the dependency source (freeze files, package description)
//! - DescriptionError: Syntax errors in a package description
//! - FinalizeError: Resolving a description's conditionals for a compiler and platform
//! - IndexError: Loading the package index
//! - ConfigError: Invalid command line configuration

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{RangeParseError, VersionParseError};
use crate::source::ConditionParseError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Dependency source related errors
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Package index related errors
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to write the report
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors raised while producing the dependency list
#[derive(Error, Debug)]
pub enum SourceError {
    /// No package description in the working directory
    #[error("no package description (*.cabal) found in {dir}")]
    DescriptionNotFound { dir: PathBuf },

    /// More than one package description in the working directory
    #[error("multiple package descriptions found in {dir}: {}", display_paths(.candidates))]
    AmbiguousDescription {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    /// Package description could not be parsed
    #[error("failed to parse package description {path}: {source}")]
    InvalidDescription {
        path: PathBuf,
        #[source]
        source: DescriptionError,
    },

    /// Package description could not be finalized
    #[error("failed to finalize package description {path}: {source}")]
    Finalize {
        path: PathBuf,
        #[source]
        source: FinalizeError,
    },

    /// Freeze file missing
    #[error("freeze file not found: {path}")]
    FreezeFileNotFound { path: PathBuf },

    /// No project marker above the working directory
    #[error("could not find {marker} in {start} or any parent directory")]
    ProjectRootNotFound { start: PathBuf, marker: String },

    /// Failed to read a source file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A constraint in a freeze file could not be parsed
    #[error("invalid constraint '{constraint}' in {path}: {message}")]
    InvalidConstraint {
        path: PathBuf,
        constraint: String,
        message: String,
    },
}

/// Syntax errors in a package description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// Generic syntax error
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Invalid dependency in a build-depends field
    #[error("line {line}: invalid dependency '{dependency}': {source}")]
    InvalidDependency {
        line: usize,
        dependency: String,
        #[source]
        source: RangeParseError,
    },

    /// Invalid `if` condition
    #[error("line {line}: {source}")]
    InvalidCondition {
        line: usize,
        #[source]
        source: ConditionParseError,
    },
}

/// Errors raised while finalizing a package description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinalizeError {
    /// A condition refers to a flag that was never declared
    #[error("{component} refers to undeclared flag '{flag}'")]
    UndeclaredFlag { component: String, flag: String },

    /// An `import:` names a common stanza that does not exist
    #[error("{component} imports unknown common stanza '{name}'")]
    UnknownImport { component: String, name: String },

    /// Common stanzas import each other in a cycle
    #[error("cyclic import of common stanza '{name}'")]
    CyclicImport { name: String },

    /// The policy disabled every component
    #[error("no components are enabled for package '{package}'")]
    NoEnabledComponents { package: String },
}

/// Errors related to the package index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Failed to read the index file
    #[error("failed to read package index {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse package index {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// A published version is malformed
    #[error("invalid version for package '{package}' in package index: {source}")]
    InvalidVersion {
        package: String,
        #[source]
        source: VersionParseError,
    },
}

/// Errors related to configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid package name in an ignore or minor list
    #[error("invalid package name '{value}'")]
    InvalidPackageName { value: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SourceError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new InvalidConstraint error
    pub fn invalid_constraint(
        path: impl Into<PathBuf>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::InvalidConstraint {
            path: path.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

impl DescriptionError {
    /// Creates a new Syntax error
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        DescriptionError::Syntax {
            line,
            message: message.into(),
        }
    }
}

impl IndexError {
    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        IndexError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_description_not_found() {
        let err = SourceError::DescriptionNotFound {
            dir: PathBuf::from("/work/proj"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("no package description"));
        assert!(msg.contains("/work/proj"));
    }

    #[test]
    fn test_source_error_ambiguous_lists_candidates() {
        let err = SourceError::AmbiguousDescription {
            dir: PathBuf::from("/work"),
            candidates: vec![PathBuf::from("/work/a.cabal"), PathBuf::from("/work/b.cabal")],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("multiple package descriptions"));
        assert!(msg.contains("/work/a.cabal, /work/b.cabal"));
    }

    #[test]
    fn test_source_error_finalize_includes_cause() {
        let err = SourceError::Finalize {
            path: PathBuf::from("foo.cabal"),
            source: FinalizeError::UndeclaredFlag {
                component: "library".to_string(),
                flag: "dev".to_string(),
            },
        };
        let msg = format!("{}", err);
        assert!(msg.contains("failed to finalize"));
        assert!(msg.contains("undeclared flag 'dev'"));
    }

    #[test]
    fn test_source_error_invalid_constraint() {
        let err = SourceError::invalid_constraint("cabal.config", "any.foo ==x", "bad version");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid constraint 'any.foo ==x'"));
        assert!(msg.contains("bad version"));
    }

    #[test]
    fn test_source_error_project_root_not_found() {
        let err = SourceError::ProjectRootNotFound {
            start: PathBuf::from("/tmp/x"),
            marker: "cabal.project".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("could not find cabal.project"));
    }

    #[test]
    fn test_description_error_syntax() {
        let err = DescriptionError::syntax(12, "unexpected 'else'");
        assert_eq!(format!("{}", err), "line 12: unexpected 'else'");
    }

    #[test]
    fn test_index_error_json_parse() {
        let err = IndexError::json_parse_error("/idx.json", "expected value");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse package index"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_config_error_invalid_package_name() {
        let err = ConfigError::InvalidPackageName {
            value: "foo bar".to_string(),
        };
        assert!(format!("{}", err).contains("invalid package name 'foo bar'"));
    }

    #[test]
    fn test_app_error_from_source_error() {
        let err: AppError = SourceError::FreezeFileNotFound {
            path: PathBuf::from("cabal.config"),
        }
        .into();
        assert!(format!("{}", err).contains("freeze file not found"));
    }

    #[test]
    fn test_app_error_from_index_error() {
        let err: AppError = IndexError::json_parse_error("/idx.json", "eof").into();
        assert!(format!("{}", err).contains("package index"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let err: AppError = ConfigError::InvalidPath {
            path: PathBuf::from("/nope"),
            message: "not a directory".to_string(),
        }
        .into();
        assert!(format!("{}", err).contains("invalid path '/nope': not a directory"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = SourceError::FreezeFileNotFound {
            path: PathBuf::from("/test"),
        };
        let debug = format!("{:?}", err);
        assert!(debug.contains("FreezeFileNotFound"));
    }
}
