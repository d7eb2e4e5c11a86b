// src/resolver/graph.rs

//! Dependency forest: shared graph nodes and the trees that reference them
//!
//! The record table is partitioned into trees, one per root (a package that
//! requires no other tracked package). A tree holds the names reachable from
//! its root by following "is depended by" edges. Nodes live once in the
//! forest's arena; a package reachable from two roots appears in both trees
//! but has a single node, so a candidate chosen while resolving one tree is
//! seen by every other tree.

use super::table::{PackageRecord, PackageRecordTable};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info};

/// Mutable resolution state for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub available_versions: Vec<String>,
    pub depends_on: BTreeMap<String, String>,
    pub is_depended_by: BTreeMap<String, String>,
    /// Version currently proposed by the resolver
    pub update_candidate: Option<String>,
    /// Candidate with the range prefix applied, set by the planner
    pub update_version: Option<String>,
    /// Version string declared in the manifest, set by the planner
    pub manifest_version: Option<String>,
}

impl GraphNode {
    fn from_record(record: &PackageRecord) -> Self {
        Self {
            name: record.name.clone(),
            current_version: record.current_version.clone(),
            latest_version: record.latest_version.clone(),
            available_versions: record.available_versions.clone(),
            depends_on: record.depends_on.clone(),
            is_depended_by: record.is_depended_by.clone(),
            update_candidate: None,
            update_version: None,
            manifest_version: None,
        }
    }

    /// Position of the current candidate in `available_versions`
    pub fn candidate_index(&self) -> Option<usize> {
        let candidate = self.update_candidate.as_ref()?;
        self.available_versions.iter().rposition(|v| v == candidate)
    }
}

/// Identity of a tree within its forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(usize);

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// Names reachable from one root, in first-visit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    id: TreeId,
    members: Vec<String>,
}

impl DependencyTree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The root is always the first member
    pub fn root(&self) -> &str {
        &self.members[0]
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

/// Shared node arena plus the trees referencing it
#[derive(Debug, Default)]
pub struct DependencyForest {
    nodes: BTreeMap<String, GraphNode>,
    trees: Vec<DependencyTree>,
}

impl DependencyForest {
    /// Partition the table into trees rooted at packages without peer requirements
    ///
    /// Fails with `UnresolvableCycle` if tracked peers require each other in a
    /// loop: such packages are unreachable from any root and would otherwise
    /// be left out of the update silently.
    pub fn build(table: &PackageRecordTable) -> Result<Self> {
        if let Some(cycle) = detect_cycle(table) {
            return Err(Error::UnresolvableCycle { cycle });
        }

        let mut forest = Self::default();
        for record in table.iter().filter(|r| r.is_root()) {
            info!("Creating the dependency tree whose root is {}", record.name);

            let mut tree = DependencyTree {
                id: TreeId(forest.trees.len()),
                members: Vec::new(),
            };
            forest.add_tree_node(table, &record.name, &mut tree)?;

            debug!("{} members: {}", tree.id, tree.members.join(", "));
            forest.trees.push(tree);
        }

        let uncovered: Vec<String> = table
            .names()
            .filter(|name| !forest.nodes.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !uncovered.is_empty() {
            return Err(Error::UnresolvableCycle { cycle: uncovered });
        }

        Ok(forest)
    }

    /// Add `name` and everything depending on it to `tree`
    ///
    /// Reuses the arena node when another tree created it already. A member
    /// reached again along a second path is not walked twice.
    fn add_tree_node(
        &mut self,
        table: &PackageRecordTable,
        name: &str,
        tree: &mut DependencyTree,
    ) -> Result<()> {
        let record = table.get(name).ok_or_else(|| {
            Error::GraphIntegrity(format!(
                "{} should be in the package table but was not found",
                name
            ))
        })?;

        if tree.contains(name) {
            return Ok(());
        }

        if !self.nodes.contains_key(name) {
            self.nodes
                .insert(name.to_string(), GraphNode::from_record(record));
        }
        tree.members.push(name.to_string());

        for dependent in record.is_depended_by.keys() {
            self.add_tree_node(table, dependent, tree)?;
        }
        Ok(())
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(name)
    }

    /// Nodes in name order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.values_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn trees(&self) -> &[DependencyTree] {
        &self.trees
    }

    pub fn tree(&self, id: TreeId) -> Option<&DependencyTree> {
        self.trees.get(id.0)
    }

    /// Trees containing `name`, in creation order
    pub fn trees_containing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = TreeId> + 'a {
        self.trees
            .iter()
            .filter(move |t| t.contains(name))
            .map(|t| t.id)
    }
}

/// Find a cycle among tracked peer requirements
///
/// Returns the packages on the cycle with the first repeated at the end
/// ("a -> b -> a").
fn detect_cycle(table: &PackageRecordTable) -> Option<Vec<String>> {
    let mut visited = HashSet::new();
    let mut stack = Vec::new();

    for name in table.names() {
        if !visited.contains(name) {
            if let Some(cycle) = dfs_cycle_detect(table, name, &mut visited, &mut stack) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs_cycle_detect<'a>(
    table: &'a PackageRecordTable,
    name: &'a str,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(name);
    stack.push(name);

    if let Some(record) = table.get(name) {
        for peer in record.depends_on.keys() {
            if let Some(pos) = stack.iter().position(|s| *s == peer.as_str()) {
                let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(peer.clone());
                return Some(cycle);
            }
            if !visited.contains(peer.as_str()) {
                if let Some(cycle) = dfs_cycle_detect(table, peer, visited, stack) {
                    return Some(cycle);
                }
            }
        }
    }

    stack.pop();
    None
}
