// src/resolver/mod.rs

//! Peer dependency resolution
//!
//! Finds the newest versions of a project's direct dependencies that still
//! satisfy each other's peer requirements. The pipeline is:
//! 1. [`PackageRecordTable`]: static facts per dependency, from the registry
//! 2. [`DependencyForest`]: trees grouped by root, sharing one node per package
//! 3. [`Resolver`]: picks an update candidate for every node, conceding to
//!    older versions where peers conflict
//! 4. [`UpdatePlan`]: manifest edits derived from the candidates

mod engine;
mod graph;
mod plan;
mod table;

pub use engine::{Assignment, Resolver};
pub use graph::{DependencyForest, DependencyTree, GraphNode, TreeId};
pub use plan::{PlannedUpdate, UpdatePlan};
pub use table::{PackageRecord, PackageRecordTable};

use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::registry::RegistryClient;

/// Query the registry and resolve every tree of the project's dependencies
///
/// Returns the resolved forest; nothing is written anywhere.
pub fn resolve_project(
    registry: &dyn RegistryClient,
    progress: &dyn ProgressTracker,
) -> Result<DependencyForest> {
    let table = PackageRecordTable::from_registry(registry, progress)?;
    let mut forest = DependencyForest::build(&table)?;
    Resolver::new(registry, &mut forest).resolve_forest()?;
    Ok(forest)
}
