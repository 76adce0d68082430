//! Outdated dependency findings

use super::{Dependency, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency with a newer release available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The dependency as analyzed (range already simplified)
    pub dependency: Dependency,
    /// Greatest version allowed by the applicable policy
    pub latest: Version,
}

impl Finding {
    pub fn new(dependency: Dependency, latest: Version) -> Self {
        Self { dependency, latest }
    }

    /// Name of the outdated package
    pub fn name(&self) -> &str {
        &self.dependency.name
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (latest: {})", self.dependency, self.latest)
    }
}
