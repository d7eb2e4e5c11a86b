// src/resolver/plan.rs

//! Update plan
//!
//! Turns resolved candidates into the manifest edits to make: the range
//! prefix policy is applied to each candidate and the result is compared with
//! what the manifest currently declares.

use super::graph::DependencyForest;
use crate::error::{Error, Result};
use crate::manifest::ManifestStore;
use crate::version::RangePrefix;
use std::fmt;
use tracing::{debug, info};

/// One manifest entry that changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub name: String,
    /// Declared version before the update; `None` if the manifest lacks it
    pub current_declared: Option<String>,
    pub new_version: String,
}

impl fmt::Display for PlannedUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.name,
            self.current_declared.as_deref().unwrap_or("(not declared)"),
            self.new_version
        )
    }
}

/// Ordered list of manifest changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub updates: Vec<PlannedUpdate>,
}

impl UpdatePlan {
    /// Compare resolved candidates against the manifest
    ///
    /// Fills `update_version` and `manifest_version` on every node. Every node
    /// must hold a candidate; one left unresolved is a `GraphIntegrity` error.
    pub fn build(
        forest: &mut DependencyForest,
        manifest: &dyn ManifestStore,
        prefix: RangePrefix,
    ) -> Result<Self> {
        let mut updates = Vec::new();

        for node in forest.nodes_mut() {
            let candidate = node.update_candidate.as_deref().ok_or_else(|| {
                Error::GraphIntegrity(format!(
                    "{} has no update candidate after resolution",
                    node.name
                ))
            })?;

            let new_version = prefix.apply(candidate);
            let declared = manifest.declared_version(&node.name);
            node.update_version = Some(new_version.clone());
            node.manifest_version = declared.clone();

            if declared.as_deref() == Some(new_version.as_str()) {
                debug!("{} stays at {}", node.name, new_version);
                continue;
            }

            updates.push(PlannedUpdate {
                name: node.name.clone(),
                current_declared: declared,
                new_version,
            });
        }

        info!("{} package(s) to update", updates.len());
        Ok(Self { updates })
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Write every change through the manifest store, then save it once
    pub fn apply(&self, manifest: &mut dyn ManifestStore) -> Result<()> {
        for update in &self.updates {
            manifest.set_declared_version(&update.name, &update.new_version)?;
        }
        manifest.save()
    }
}
