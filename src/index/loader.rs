//! JSON package catalog loader
//!
//! The catalog lists published versions per package:
//!
//! ```json
//! { "packages": { "text": ["2.0.2", "2.1.1"], "base": ["4.18.0.0"] } }
//! ```

use super::InMemoryIndex;
use crate::domain::Version;
use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// On-disk representation of the package catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFile {
    /// Published version strings per package name
    #[serde(default)]
    pub packages: BTreeMap<String, Vec<String>>,
}

impl IndexFile {
    /// Converts the raw catalog into a queryable index
    pub fn into_index(self) -> Result<InMemoryIndex, IndexError> {
        let mut index = InMemoryIndex::new();
        for (package, raw_versions) in self.packages {
            let versions = raw_versions
                .iter()
                .map(|raw| raw.parse::<Version>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| IndexError::InvalidVersion {
                    package: package.clone(),
                    source,
                })?;
            index.insert(package, versions);
        }
        Ok(index)
    }
}

/// Load a package index from a JSON catalog file
pub fn load_index(path: &Path) -> Result<InMemoryIndex, IndexError> {
    let content = std::fs::read_to_string(path).map_err(|source| IndexError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let file: IndexFile = serde_json::from_str(&content)
        .map_err(|e| IndexError::json_parse_error(path, e.to_string()))?;

    let index = file.into_index()?;
    debug!(path = %path.display(), packages = index.len(), "loaded package index");
    Ok(index)
}
