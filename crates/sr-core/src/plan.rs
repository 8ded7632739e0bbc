//! Dependency planning: turn relations plus discovered scripts into an
//! ordered forest whose post-order traversal is a safe execution order.
//!
//! Planning runs in three steps:
//!
//! 1. [`build_entries`] flattens the manifest and the walked files into
//!    [`ScriptEntry`] rows and stable-sorts them by `serial`, so every walked
//!    file (serial 1) precedes every declared dependency (serial 2, 3, ...).
//! 2. [`ScriptForest::from_entries`] places the rows into an arena of nodes.
//!    Parents are found through a `name -> first node` map once every node
//!    exists, so placement does not depend on manifest order.
//! 3. [`ScriptForest::execution_order`] yields the post-order traversal:
//!    children (dependencies) left to right, then the node itself.

use crate::error::{CoreError, CoreResult};
use crate::relations::Relation;
use crate::script_name::ScriptName;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Serial assigned to every walked script file
const WALKED_SERIAL: usize = 1;

/// First serial handed out to manifest dependencies
const FIRST_DEPENDENCY_SERIAL: usize = 2;

/// One row of the planner's working list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Basename of the script
    pub id: ScriptName,

    /// Basename of the script that depends on this one, if declared
    pub parent_id: Option<ScriptName>,

    /// Resolved path on disk; empty when a dependency names no walked file
    pub file_path: PathBuf,

    /// Sort key: 1 for walked files, increasing from 2 for dependencies
    pub serial: usize,
}

/// A placed node in the forest arena
#[derive(Debug, Clone)]
pub struct ForestNode {
    id: ScriptName,
    file_path: PathBuf,
    children: Vec<usize>,
}

impl ForestNode {
    /// Script basename
    pub fn id(&self) -> &ScriptName {
        &self.id
    }

    /// Path on disk (empty when the dependency was not found)
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Whether the node points at a file that was actually discovered
    pub fn is_resolved(&self) -> bool {
        !self.file_path.as_os_str().is_empty()
    }
}

/// Nested, serialisable view of a forest node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: String,
    pub file_path: String,
    pub children: Vec<PlanNode>,
}

/// Ordered forest of scripts, stored as an arena addressed by index
#[derive(Debug, Clone, Default)]
pub struct ScriptForest {
    nodes: Vec<ForestNode>,
    roots: Vec<usize>,
}

impl ScriptForest {
    /// Place sorted entries into a forest.
    ///
    /// A walked file that some dependency entry resolved to is not placed as
    /// its own root; the dependency entry stands for it. Every other entry
    /// becomes a node, attached under the first node named by its
    /// `parent_id`, or made a root when no such node exists. Dependency
    /// nodes take precedence over walked nodes of the same name when
    /// looking up a parent.
    pub fn from_entries(entries: &[ScriptEntry]) -> Self {
        let declared: HashSet<&Path> = entries
            .iter()
            .filter(|e| e.parent_id.is_some() && !e.file_path.as_os_str().is_empty())
            .map(|e| e.file_path.as_path())
            .collect();

        let mut forest = Self::default();
        let mut pending: Vec<(usize, &ScriptEntry)> = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.parent_id.is_none() && declared.contains(entry.file_path.as_path()) {
                continue;
            }
            pending.push((forest.nodes.len(), entry));
            forest.nodes.push(ForestNode {
                id: entry.id.clone(),
                file_path: entry.file_path.clone(),
                children: Vec::new(),
            });
        }

        let mut first_by_name: HashMap<&ScriptName, usize> = HashMap::new();
        let (dependencies, walked): (Vec<_>, Vec<_>) =
            pending.iter().partition(|(_, e)| e.parent_id.is_some());
        for &(idx, entry) in dependencies.into_iter().chain(walked) {
            first_by_name.entry(&entry.id).or_insert(idx);
        }

        for (idx, entry) in pending {
            let parent = entry
                .parent_id
                .as_ref()
                .and_then(|name| first_by_name.get(name).copied())
                .filter(|&p| p != idx);
            match parent {
                Some(p) => forest.nodes[p].children.push(idx),
                None => forest.roots.push(idx),
            }
        }

        forest
    }

    /// Number of placed nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in insertion order
    pub fn roots(&self) -> impl Iterator<Item = &ForestNode> {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    /// Post-order traversal: each node after all of its descendants
    pub fn execution_order(&self) -> Vec<&ForestNode> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.post_order(root, &mut order);
        }
        order
    }

    fn post_order<'a>(&'a self, idx: usize, order: &mut Vec<&'a ForestNode>) {
        for &child in &self.nodes[idx].children {
            self.post_order(child, order);
        }
        order.push(&self.nodes[idx]);
    }

    /// Nested view of the forest, suitable for JSON output
    pub fn to_plan_nodes(&self) -> Vec<PlanNode> {
        self.roots.iter().map(|&idx| self.plan_node(idx)).collect()
    }

    fn plan_node(&self, idx: usize) -> PlanNode {
        let node = &self.nodes[idx];
        PlanNode {
            id: node.id.to_string(),
            file_path: node.file_path.to_string_lossy().into_owned(),
            children: node.children.iter().map(|&c| self.plan_node(c)).collect(),
        }
    }

    /// Serialize the forest as a JSON array of root nodes
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.to_plan_nodes())?)
    }
}

/// Plan the execution of `files` according to `relations`.
///
/// Rejects manifests whose relations form a cycle.
pub fn plan_scripts(relations: &[Relation], files: &[PathBuf]) -> CoreResult<ScriptForest> {
    validate_acyclic(relations)?;
    warn_duplicate_basenames(files);

    let entries = build_entries(relations, files)?;
    Ok(ScriptForest::from_entries(&entries))
}

/// Flatten relations and walked files into a working list sorted by serial.
pub fn build_entries(relations: &[Relation], files: &[PathBuf]) -> CoreResult<Vec<ScriptEntry>> {
    let mut entries = Vec::new();
    let mut serial = FIRST_DEPENDENCY_SERIAL;

    for relation in relations {
        let parent = script_name(&relation.file, "relation 'file'")?;
        for dep in &relation.dependencies {
            entries.push(ScriptEntry {
                id: script_name(dep, &format!("dependencies of '{}'", relation.file))?,
                parent_id: Some(parent.clone()),
                file_path: resolve_path(dep, files),
                serial,
            });
            serial += 1;
        }
    }

    for file in files {
        let id = ScriptName::from_path(file).ok_or_else(|| CoreError::EmptyName {
            context: format!("walked path '{}'", file.display()),
        })?;
        entries.push(ScriptEntry {
            id,
            parent_id: None,
            file_path: file.clone(),
            serial: WALKED_SERIAL,
        });
    }

    entries.sort_by_key(|e| e.serial);
    Ok(entries)
}

/// Find the first walked file whose basename is `basename`.
///
/// Returns an empty path when nothing matches.
pub fn resolve_path(basename: &str, files: &[PathBuf]) -> PathBuf {
    let found = files
        .iter()
        .find(|f| f.file_name().is_some_and(|name| name == basename));
    match found {
        Some(path) => path.clone(),
        None => {
            log::warn!("Dependency {basename} does not match any discovered sql file");
            PathBuf::new()
        }
    }
}

fn script_name(raw: &str, context: &str) -> CoreResult<ScriptName> {
    ScriptName::try_new(raw).ok_or_else(|| CoreError::EmptyName {
        context: context.to_string(),
    })
}

fn warn_duplicate_basenames(files: &[PathBuf]) {
    let mut seen: HashMap<&std::ffi::OsStr, &Path> = HashMap::new();
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        if let Some(first) = seen.get(name) {
            log::warn!(
                "Duplicate script name {}: dependencies resolve to {}; {} runs as an independent script",
                name.to_string_lossy(),
                first.display(),
                file.display()
            );
        } else {
            seen.insert(name, file);
        }
    }
}

/// Reject relations that form a cycle (including a script depending on itself).
fn validate_acyclic(relations: &[Relation]) -> CoreResult<()> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

    for relation in relations {
        let parent = graph_node(&mut graph, &mut node_map, &relation.file);
        for dep in &relation.dependencies {
            let child = graph_node(&mut graph, &mut node_map, dep);
            // Edge from dependency to dependent: dependencies sort first
            graph.update_edge(child, parent, ());
        }
    }

    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(CoreError::CircularDependency {
            cycle: find_cycle_path(&graph, cycle.node_id()),
        }),
    }
}

fn graph_node<'a>(
    graph: &mut DiGraph<&'a str, ()>,
    node_map: &mut HashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *node_map
        .entry(name)
        .or_insert_with(|| graph.add_node(name))
}

/// Render the shortest cycle through `start` as `a -> b -> a`.
fn find_cycle_path(graph: &DiGraph<&str, ()>, start: NodeIndex) -> String {
    let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if next == start {
                let mut path = vec![graph[start]];
                let mut cursor = current;
                while cursor != start {
                    path.push(graph[cursor]);
                    cursor = previous[&cursor];
                }
                path.push(graph[start]);
                let end = path.len() - 1;
                path[1..end].reverse();
                return path.join(" -> ");
            }
            if !previous.contains_key(&next) {
                previous.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    graph[start].to_string()
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
