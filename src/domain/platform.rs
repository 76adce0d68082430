//! Compiler and platform identities
//!
//! Package descriptions are finalized for one compiler (`ghc-9.6.6`) and one
//! platform (operating system + architecture). Names follow the spelling used
//! in `os(...)` and `arch(...)` conditions.

use super::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a compiler identity cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid compiler '{input}': expected NAME-VERSION, e.g. 'ghc-9.6.6'")]
pub struct PlatformParseError {
    pub input: String,
}

/// A compiler flavour and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerId {
    pub flavor: String,
    pub version: Version,
}

impl CompilerId {
    pub fn new(flavor: impl Into<String>, version: Version) -> Self {
        Self {
            flavor: flavor.into().to_ascii_lowercase(),
            version,
        }
    }
}

impl FromStr for CompilerId {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PlatformParseError {
            input: s.to_string(),
        };
        let (flavor, version) = s.trim().rsplit_once('-').ok_or_else(err)?;
        if flavor.is_empty() {
            return Err(err());
        }
        let version = version.parse().map_err(|_| err())?;
        Ok(CompilerId::new(flavor, version))
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.flavor, self.version)
    }
}

/// Operating system and architecture a description is finalized for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Creates a platform, normalizing common aliases (`darwin` → `osx`, ...)
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os: canonical_os(os.as_ref()),
            arch: canonical_arch(arch.as_ref()),
        }
    }

    /// The platform this binary runs on
    pub fn host() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Returns true if `name` (as written in `os(name)`) denotes this OS
    pub fn is_os(&self, name: &str) -> bool {
        canonical_os(name) == self.os
    }

    /// Returns true if `name` (as written in `arch(name)`) denotes this architecture
    pub fn is_arch(&self, name: &str) -> bool {
        canonical_arch(name) == self.arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}

fn canonical_os(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.as_str() {
        "macos" | "darwin" => "osx".to_string(),
        "mingw32" | "win32" | "cygwin32" => "windows".to_string(),
        "kfreebsdgnu" => "freebsd".to_string(),
        "solaris2" => "solaris".to_string(),
        _ => lower,
    }
}

fn canonical_arch(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.as_str() {
        "x86" | "i486" | "i586" | "i686" => "i386".to_string(),
        "amd64" => "x86_64".to_string(),
        "arm64" => "aarch64".to_string(),
        "powerpc64" => "ppc64".to_string(),
        _ => lower,
    }
}
