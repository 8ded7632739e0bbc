//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sr_core::{load_relations, plan_scripts, walk_files, ScriptForest};
use std::path::{Path, PathBuf};

/// Extension of the files picked up by the runner and the planner.
pub(crate) const SQL_EXTENSION: &str = ".sql";

/// Walk `dir` for `.sql` files in lexicographic path order.
pub(crate) fn discover_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    walk_files(dir, &[SQL_EXTENSION])
        .with_context(|| format!("failed to walk directory: {}", dir.display()))
}

/// Build the dependency forest for the `.sql` files under `dir`.
pub(crate) fn build_forest(relations_path: &Path, dir: &Path) -> Result<ScriptForest> {
    let files = discover_scripts(dir)?;
    let relations = load_relations(relations_path)?;
    let forest = plan_scripts(&relations, &files)?;
    log::debug!(
        "Planned {} node(s) from {} file(s) and {} relation(s)",
        forest.len(),
        files.len(),
        relations.len()
    );
    Ok(forest)
}
