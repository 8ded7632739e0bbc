//! Relations manifest (`.db-relation.yml`) loading.
//!
//! The manifest lists, for a parent script, the scripts that must be applied
//! before it:
//!
//! ```yaml
//! relations:
//!   - file: orders.sql
//!     dependencies: [users.sql]
//! ```

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level manifest document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationsManifest {
    /// Relations in declaration order
    #[serde(default)]
    pub relations: Option<Vec<Relation>>,
}

/// One parent script and the scripts it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Basename of the parent script
    pub file: String,

    /// Basenames of scripts that must run before `file`
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl RelationsManifest {
    /// Parse a manifest from YAML text. Empty documents yield no relations.
    pub fn from_yaml(content: &str, origin: &Path) -> CoreResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| CoreError::RelationsParseError {
            path: origin.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Consume the manifest, returning its relations in declaration order
    pub fn into_relations(self) -> Vec<Relation> {
        self.relations.unwrap_or_default()
    }
}

/// Load the relations declared in the manifest at `path`.
///
/// A missing manifest is not an error: it is logged and treated as declaring
/// no relations. Any other read failure or a malformed document is.
pub fn load_relations(path: &Path) -> CoreResult<Vec<Relation>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!(
                "Relations manifest {} not found, continuing without relations",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let relations = RelationsManifest::from_yaml(&content, path)?.into_relations();
    log::debug!(
        "Loaded {} relation(s) from {}",
        relations.len(),
        path.display()
    );
    Ok(relations)
}

#[cfg(test)]
#[path = "relations_test.rs"]
mod tests;
