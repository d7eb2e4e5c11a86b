// src/resolver/engine.rs

//! Version resolution engine
//!
//! Picks an update candidate for every node of a [`DependencyForest`]:
//! each package starts at its latest version and is walked down its version
//! list only when a peer requirement cannot be met otherwise.
//!
//! One resolution step for a package:
//! 1. select a candidate (latest on first visit, an older one when forced)
//! 2. fetch that version's metadata from the registry
//! 3. check every tracked peer the package requires against the peer's
//!    candidate; a conflict either lowers this package (the peer is below
//!    anything the range accepts) or lowers the peer to a version inside the
//!    range, and ends the step
//! 4. after a forced lowering, re-check the package in every other tree
//!    that contains it
//! 5. visit every package that depends on this one
//!
//! Steps are driven from an explicit work stack rather than recursion so a
//! long chain of concessions cannot exhaust the call stack. Tasks are pushed
//! in reverse so they pop in the same order the recursive walk would visit
//! them.

use super::graph::{DependencyForest, TreeId};
use crate::error::{Error, Result};
use crate::registry::{package_spec, PackageInfo, RegistryClient};
use crate::version::VersionRange;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// One candidate assignment made during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub package: String,
    pub version: String,
}

/// Pending work on the resolution stack
#[derive(Debug, Clone)]
enum Task {
    /// Steps 1-4 for one package within one tree
    Select {
        tree: TreeId,
        name: String,
        force_lower: bool,
        required_range: Option<VersionRange>,
    },
    /// Step 5: visit the dependents of a settled package
    Propagate { tree: TreeId, name: String },
}

/// Resolves update candidates on a forest in place
pub struct Resolver<'a> {
    registry: &'a dyn RegistryClient,
    forest: &'a mut DependencyForest,
    stack: Vec<Task>,
    /// (tree, package, candidate) re-checks already performed
    rechecked: HashSet<(TreeId, String, String)>,
    /// Packages lowered by a selection that deferred before step 4
    pending_recheck: HashSet<String>,
    /// name@version -> metadata; versions are immutable once published
    metadata: HashMap<String, PackageInfo>,
    history: Vec<Assignment>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a dyn RegistryClient, forest: &'a mut DependencyForest) -> Self {
        Self {
            registry,
            forest,
            stack: Vec::new(),
            rechecked: HashSet::new(),
            pending_recheck: HashSet::new(),
            metadata: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Resolve every tree, starting from its root, in tree order
    pub fn resolve_forest(&mut self) -> Result<()> {
        let roots: Vec<(TreeId, String)> = self
            .forest
            .trees()
            .iter()
            .map(|t| (t.id(), t.root().to_string()))
            .collect();

        for (tree, root) in roots {
            info!("Updating the dependency tree whose root is {}", root);
            self.resolve(tree, &root, false, None)?;
            info!("  -> Updated the dependency tree whose root is {}", root);
        }
        Ok(())
    }

    /// Resolve `name` within `tree` and everything the change reaches
    ///
    /// `force_lower` moves an already chosen candidate to an older version;
    /// with `required_range` the newest older version inside that range is
    /// taken instead of the next older one.
    pub fn resolve(
        &mut self,
        tree: TreeId,
        name: &str,
        force_lower: bool,
        required_range: Option<&VersionRange>,
    ) -> Result<()> {
        self.stack.push(Task::Select {
            tree,
            name: name.to_string(),
            force_lower,
            required_range: required_range.cloned(),
        });

        while let Some(task) = self.stack.pop() {
            match task {
                Task::Select {
                    tree,
                    name,
                    force_lower,
                    required_range,
                } => self.select(tree, &name, force_lower, required_range.as_ref())?,
                Task::Propagate { tree, name } => self.propagate(tree, &name)?,
            }
        }
        Ok(())
    }

    /// Every candidate assignment so far, in order
    pub fn history(&self) -> &[Assignment] {
        &self.history
    }

    fn select(
        &mut self,
        tree: TreeId,
        name: &str,
        force_lower: bool,
        required_range: Option<&VersionRange>,
    ) -> Result<()> {
        let node = self.forest.node(name).ok_or_else(|| missing_node(name))?;
        let previous = node.update_candidate.clone();

        debug!("Selecting the update candidate of {}", name);
        let candidate = match &previous {
            None => {
                debug!("  -> First selection; starting from latest {}", node.latest_version);
                node.latest_version.clone()
            }
            Some(current) if force_lower => self.lower_candidate(name, current, required_range)?,
            Some(current) => {
                debug!("  -> Candidate {} already selected", current);
                current.clone()
            }
        };
        if previous.as_ref() != Some(&candidate) {
            self.assign(name, Some(candidate.clone()))?;
        }

        let info = self.fetch(name, &candidate)?;
        let peers: Vec<String> = self
            .forest
            .node(name)
            .ok_or_else(|| missing_node(name))?
            .depends_on
            .keys()
            .cloned()
            .collect();

        for peer in peers {
            let raw = info.required_range(&peer).ok_or_else(|| Error::MissingRange {
                package: name.to_string(),
                version: candidate.clone(),
                dependency: peer.clone(),
            })?;
            let range = VersionRange::parse(raw)?;
            debug!("{}@{} requires {}@{}", name, candidate, peer, range);

            let in_tree = self
                .forest
                .tree(tree)
                .is_some_and(|t| t.contains(&peer));
            if !in_tree {
                debug!("  -> {} is not in {}; it is checked with its own tree", peer, tree);
                continue;
            }

            let peer_node = self.forest.node(&peer).ok_or_else(|| missing_node(&peer))?;
            let Some(peer_candidate) = peer_node.update_candidate.clone() else {
                debug!(
                    "  -> {} has no candidate yet; deferring {} until it is selected",
                    peer, name
                );
                if previous.is_none() {
                    self.assign(name, None)?;
                } else if force_lower {
                    self.pending_recheck.insert(name.to_string());
                }
                return Ok(());
            };

            if range.satisfies(&peer_candidate)? {
                continue;
            }

            if range.is_below(&peer_candidate)? {
                debug!(
                    "  -> {}@{} is below {}; lowering {}",
                    peer, peer_candidate, range, name
                );
                self.stack.push(Task::Select {
                    tree,
                    name: name.to_string(),
                    force_lower: true,
                    required_range: None,
                });
            } else {
                debug!(
                    "  -> {}@{} is above {}; lowering {}",
                    peer, peer_candidate, range, peer
                );
                self.stack.push(Task::Select {
                    tree,
                    name: peer,
                    force_lower: true,
                    required_range: Some(range),
                });
            }
            return Ok(());
        }

        self.stack.push(Task::Propagate {
            tree,
            name: name.to_string(),
        });

        let pending = self.pending_recheck.remove(name);
        if force_lower || pending {
            self.schedule_recheck(tree, name, &candidate);
        }
        Ok(())
    }

    /// Step 4: the candidate moved under every other tree sharing this node
    ///
    /// Re-checks pop in tree order.
    fn schedule_recheck(&mut self, tree: TreeId, name: &str, candidate: &str) {
        let others: Vec<TreeId> = self
            .forest
            .trees_containing(name)
            .filter(|id| *id != tree)
            .collect();

        for other in others.into_iter().rev() {
            if !self
                .rechecked
                .insert((other, name.to_string(), candidate.to_string()))
            {
                debug!("{}@{} was already re-checked in {}", name, candidate, other);
                continue;
            }

            debug!(
                "Candidate of {} changed to {}; re-checking it in {}",
                name, candidate, other
            );
            self.stack.push(Task::Select {
                tree: other,
                name: name.to_string(),
                force_lower: false,
                required_range: None,
            });
        }
    }

    /// Step 5
    fn propagate(&mut self, tree: TreeId, name: &str) -> Result<()> {
        let node = self.forest.node(name).ok_or_else(|| missing_node(name))?;
        debug!(
            "Selected candidate {} for {}",
            node.update_candidate.as_deref().unwrap_or("-"),
            name
        );

        let tree_ref = self
            .forest
            .tree(tree)
            .ok_or_else(|| Error::GraphIntegrity(format!("{} does not exist", tree)))?;
        let dependents: Vec<String> = node
            .is_depended_by
            .keys()
            .filter(|d| tree_ref.contains(d))
            .cloned()
            .collect();

        for dependent in dependents.into_iter().rev() {
            self.stack.push(Task::Select {
                tree,
                name: dependent,
                force_lower: false,
                required_range: None,
            });
        }
        Ok(())
    }

    /// Pick the version to concede to
    fn lower_candidate(
        &self,
        name: &str,
        current: &str,
        required_range: Option<&VersionRange>,
    ) -> Result<String> {
        let node = self.forest.node(name).ok_or_else(|| missing_node(name))?;
        let index = node.candidate_index().ok_or_else(|| {
            Error::GraphIntegrity(format!(
                "candidate {} of {} is not an available version",
                current, name
            ))
        })?;

        if index == 0 {
            return Err(Error::NoCandidate {
                package: name.to_string(),
                reason: format!("{} is the oldest available version", current),
            });
        }

        let older = &node.available_versions[..index];
        let lowered = match required_range {
            Some(range) => {
                let mut found = None;
                for version in older.iter().rev() {
                    if range.satisfies(version)? {
                        found = Some(version.clone());
                        break;
                    }
                }
                found.ok_or_else(|| Error::NoCandidate {
                    package: name.to_string(),
                    reason: format!("no version older than {} satisfies {}", current, range),
                })?
            }
            None => older[index - 1].clone(),
        };

        debug!("  -> Lowering {} from {} to {}", name, current, lowered);
        Ok(lowered)
    }

    fn assign(&mut self, name: &str, candidate: Option<String>) -> Result<()> {
        let node = self.forest.node_mut(name).ok_or_else(|| missing_node(name))?;
        if let Some(version) = &candidate {
            self.history.push(Assignment {
                package: name.to_string(),
                version: version.clone(),
            });
        }
        node.update_candidate = candidate;
        Ok(())
    }

    fn fetch(&mut self, name: &str, version: &str) -> Result<PackageInfo> {
        let spec = package_spec(name, version);
        if let Some(info) = self.metadata.get(&spec) {
            return Ok(info.clone());
        }
        let info = self.registry.info(&spec)?;
        self.metadata.insert(spec, info.clone());
        Ok(info)
    }
}

fn missing_node(name: &str) -> Error {
    Error::GraphIntegrity(format!("{} has no node in the dependency forest", name))
}
