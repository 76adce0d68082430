//! Dependency information structures

use super::VersionRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared dependency: a package name and the versions it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Accepted versions
    pub range: VersionRange,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    /// Creates a dependency accepting any version
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, VersionRange::Any)
    }

    /// Returns the same dependency with its range in canonical form
    pub fn simplify(&self) -> Self {
        Self::new(self.name.clone(), self.range.simplify())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.range.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.range)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> VersionRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_dependency_new() {
        let dep = Dependency::new("text", range(">=2.0"));
        assert_eq!(dep.name, "text");
        assert_eq!(dep.range, range(">=2.0"));
    }

    #[test]
    fn test_dependency_any() {
        let dep = Dependency::any("base");
        assert_eq!(dep.range, VersionRange::Any);
    }

    #[test]
    fn test_dependency_simplify() {
        let dep = Dependency::new("aeson", range("^>=2.1 && >=2.0"));
        assert_eq!(dep.simplify().to_string(), "aeson >=2.1 && <2.2");
        assert_eq!(dep.simplify().name, "aeson");
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("base", range(">=4.14 && <5"));
        assert_eq!(format!("{}", dep), "base >=4.14 && <5");
    }

    #[test]
    fn test_dependency_display_any() {
        assert_eq!(Dependency::any("containers").to_string(), "containers");
        assert_eq!(
            Dependency::new("containers", range(">=0")).to_string(),
            "containers"
        );
    }

    #[test]
    fn test_serde_dependency() {
        let dep = Dependency::new("lens", range("^>=5.2"));
        let json = serde_json::to_string(&dep).unwrap();
        let parsed: Dependency = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dep);
    }
}
