//! Package version numbers
//!
//! A version is a dotted sequence of non-negative integers such as
//! `1.2.0.3`. Ordering is component-wise with missing trailing
//! components treated as zero, so `1.2 == 1.2.0` and `1.2 < 1.2.1`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version literal is malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{input}': {message}")]
pub struct VersionParseError {
    pub input: String,
    pub message: String,
}

impl VersionParseError {
    fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// A package version
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Creates a version from its numeric components
    ///
    /// An empty component list is normalized to `0`.
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        let mut components = components.into();
        if components.is_empty() {
            components.push(0);
        }
        Self { components }
    }

    /// The smallest possible version, `0`
    pub fn zero() -> Self {
        Self::new(vec![0])
    }

    /// Returns the components as written
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Returns the component at `index`, treating missing components as zero
    pub fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// Components with trailing zeros removed; the canonical key for equality
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }

    /// Upper bound of a major series: `a.b.c` becomes `a.(b+1)`
    ///
    /// `^>=1.2.3` and minor relaxation both stop just below this version.
    pub fn major_upper_bound(&self) -> Version {
        Version::new(vec![self.component(0), self.component(1).saturating_add(1)])
    }

    /// Upper bound of a wildcard: `1.2` (as in `==1.2.*`) becomes `1.3`
    pub fn wildcard_upper_bound(&self) -> Version {
        let mut components = self.components.clone();
        if let Some(last) = components.last_mut() {
            *last = last.saturating_add(1);
        }
        Version::new(components)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::new(s, "empty version"));
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionParseError::new(
                        s,
                        format!("component '{}' is not a number", part),
                    ));
                }
                part.parse::<u64>()
                    .map_err(|e| VersionParseError::new(s, e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Version::new(components))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
