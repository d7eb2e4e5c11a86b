// src/resolver/table.rs

//! Package record table
//!
//! Static facts about every direct dependency of the project, built once
//! from registry queries and never mutated afterwards.

use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use crate::registry::{PackageInfo, RegistryClient};
use crate::version;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Immutable facts about one direct dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    /// Version installed in node_modules
    pub current_version: String,
    /// Version behind the `latest` dist-tag
    pub latest_version: String,
    /// Every published version, oldest first
    pub available_versions: Vec<String>,
    /// Peer name -> range this package requires of it (tracked peers only)
    pub depends_on: BTreeMap<String, String>,
    /// Peer name -> range that peer requires of this package
    pub is_depended_by: BTreeMap<String, String>,
}

impl PackageRecord {
    /// Create a record with no peer edges
    ///
    /// The version list is sorted and completed with the installed and latest
    /// versions if the registry omitted them.
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        latest_version: impl Into<String>,
        available_versions: Vec<String>,
    ) -> Result<Self> {
        let current_version = current_version.into();
        let latest_version = latest_version.into();

        let mut available_versions = available_versions;
        for v in [&current_version, &latest_version] {
            if !available_versions.contains(v) {
                available_versions.push(v.clone());
            }
        }
        version::sort_versions(&mut available_versions)?;

        Ok(Self {
            name: name.into(),
            current_version,
            latest_version,
            available_versions,
            depends_on: BTreeMap::new(),
            is_depended_by: BTreeMap::new(),
        })
    }

    /// Add an outgoing peer edge
    pub fn with_peer(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.depends_on.insert(name.into(), range.into());
        self
    }

    /// A root requires no other tracked package
    pub fn is_root(&self) -> bool {
        self.depends_on.is_empty()
    }
}

/// Name-keyed collection of package records
#[derive(Debug, Clone, Default)]
pub struct PackageRecordTable {
    records: BTreeMap<String, PackageRecord>,
}

impl PackageRecordTable {
    /// Build a table from records
    ///
    /// Peer edges toward packages outside the table are dropped and the
    /// inverse `is_depended_by` maps are derived from `depends_on`.
    pub fn from_records(records: impl IntoIterator<Item = PackageRecord>) -> Result<Self> {
        let mut table = Self {
            records: records
                .into_iter()
                .map(|record| (record.name.clone(), record))
                .collect(),
        };

        let tracked: BTreeSet<String> = table.records.keys().cloned().collect();
        for record in table.records.values_mut() {
            record.depends_on.retain(|peer, _| {
                let keep = tracked.contains(peer);
                if !keep {
                    debug!(
                        "Ignoring peer {} of {}: not a direct dependency",
                        peer, record.name
                    );
                }
                keep
            });
        }

        table.link_inverse_edges()?;
        Ok(table)
    }

    /// Query the registry for every installed direct dependency
    pub fn from_registry(
        registry: &dyn RegistryClient,
        progress: &dyn ProgressTracker,
    ) -> Result<Self> {
        let installed = registry.list_installed()?;
        let dependencies = installed.dependencies.ok_or_else(|| {
            Error::Registry("Dependencies were not found in the output of 'npm list'".to_string())
        })?;

        for (name, package) in &dependencies {
            debug!("  * {}: {}", name, package.version.as_deref().unwrap_or("missing"));
        }

        let tracked: BTreeSet<&str> = dependencies.keys().map(String::as_str).collect();
        progress.set_length(dependencies.len() as u64);

        let mut records = Vec::with_capacity(dependencies.len());
        for (name, package) in &dependencies {
            let Some(current) = package.version.as_deref() else {
                warn!("{} is declared but not installed; skipping it", name);
                progress.increment(1);
                continue;
            };

            progress.set_message(&format!("npm info {}", name));
            let info = match registry.info(name) {
                Ok(info) => info,
                Err(e) => {
                    progress.finish_with_error(&e.to_string());
                    return Err(e);
                }
            };
            records.push(record_from_info(name, current, info, &tracked)?);
            progress.increment(1);
        }
        progress.finish_with_message("Fetched package metadata");

        let table = Self::from_records(records)?;
        info!(
            "Tracking {} direct dependencies ({} with peer requirements)",
            table.len(),
            table.iter().filter(|r| !r.is_root()).count()
        );
        Ok(table)
    }

    /// Derive `is_depended_by` from `depends_on`
    fn link_inverse_edges(&mut self) -> Result<()> {
        let edges: Vec<(String, String, String)> = self
            .records
            .values()
            .flat_map(|record| {
                record
                    .depends_on
                    .iter()
                    .map(|(peer, range)| (record.name.clone(), peer.clone(), range.clone()))
            })
            .collect();

        for record in self.records.values_mut() {
            record.is_depended_by.clear();
        }

        for (dependent, peer, range) in edges {
            let target = self.records.get_mut(&peer).ok_or_else(|| {
                Error::GraphIntegrity(format!(
                    "{} should be in the package table but was not found",
                    peer
                ))
            })?;
            target.is_depended_by.insert(dependent, range);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.records.get(name)
    }

    /// Records in name order
    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn `npm info <name>` output into a record, keeping only tracked peers
///
/// Only peer dependencies form edges: regular dependencies of a dependency
/// are installed independently and dev dependencies never reach the project.
fn record_from_info(
    name: &str,
    current: &str,
    info: PackageInfo,
    tracked: &BTreeSet<&str>,
) -> Result<PackageRecord> {
    let mut record = PackageRecord::new(name, current, info.version, info.versions)?;
    for (peer, range) in info.peer_dependencies {
        if tracked.contains(peer.as_str()) && peer != name {
            record.depends_on.insert(peer, range);
        }
    }
    Ok(record)
}
