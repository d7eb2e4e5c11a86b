// src/registry/memory.rs

//! In-memory registry
//!
//! Holds published versions and their peer metadata without touching the
//! network. Used by the test suite.

use super::{split_spec, InstalledPackage, InstalledTree, PackageInfo, RegistryClient};
use crate::error::{Error, Result};
use crate::version;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
struct PublishedPackage {
    /// version -> metadata of that version
    versions: BTreeMap<String, PackageInfo>,
    latest: Option<String>,
}

/// Registry serving package data from memory
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    packages: BTreeMap<String, PublishedPackage>,
    installed: BTreeMap<String, String>,
    queries: RefCell<Vec<String>>,
    installs: Cell<usize>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `name@version` declaring the given peer dependencies
    pub fn publish(&mut self, name: &str, version: &str, peers: &[(&str, &str)]) -> &mut Self {
        self.publish_version(name, version, &[], peers)
    }

    /// Publish `name@version` with regular and peer dependencies
    pub fn publish_version(
        &mut self,
        name: &str,
        version: &str,
        dependencies: &[(&str, &str)],
        peers: &[(&str, &str)],
    ) -> &mut Self {
        let info = PackageInfo {
            name: name.to_string(),
            version: version.to_string(),
            versions: Vec::new(),
            dependencies: to_map(dependencies),
            peer_dependencies: to_map(peers),
        };
        self.packages
            .entry(name.to_string())
            .or_default()
            .versions
            .insert(version.to_string(), info);
        self
    }

    /// Override the `latest` dist-tag (defaults to the highest published version)
    pub fn set_latest(&mut self, name: &str, version: &str) -> &mut Self {
        self.packages.entry(name.to_string()).or_default().latest = Some(version.to_string());
        self
    }

    /// Record `name@version` as installed in the project
    pub fn install_version(&mut self, name: &str, version: &str) -> &mut Self {
        self.installed.insert(name.to_string(), version.to_string());
        self
    }

    /// Every `info` query received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// Number of `install` calls received
    pub fn install_count(&self) -> usize {
        self.installs.get()
    }

    fn sorted_versions(package: &PublishedPackage) -> Result<Vec<String>> {
        let mut versions: Vec<String> = package.versions.keys().cloned().collect();
        version::sort_versions(&mut versions)?;
        Ok(versions)
    }
}

impl RegistryClient for MemoryRegistry {
    fn info(&self, spec: &str) -> Result<PackageInfo> {
        self.queries.borrow_mut().push(spec.to_string());

        let (name, requested) = split_spec(spec);
        let package = self
            .packages
            .get(name)
            .ok_or_else(|| Error::Registry(format!("404 Not Found: {}", name)))?;

        let versions = Self::sorted_versions(package)?;
        let selected = match requested {
            Some(v) => v.to_string(),
            None => package
                .latest
                .clone()
                .or_else(|| versions.last().cloned())
                .ok_or_else(|| Error::Registry(format!("{} has no published versions", name)))?,
        };

        let mut info = package
            .versions
            .get(&selected)
            .cloned()
            .ok_or_else(|| Error::Registry(format!("404 Not Found: {}@{}", name, selected)))?;
        info.versions = versions;
        Ok(info)
    }

    fn list_installed(&self) -> Result<InstalledTree> {
        let dependencies = self
            .installed
            .iter()
            .map(|(name, version)| {
                (
                    name.clone(),
                    InstalledPackage {
                        version: Some(version.clone()),
                    },
                )
            })
            .collect();
        Ok(InstalledTree {
            name: None,
            dependencies: Some(dependencies),
        })
    }

    fn install(&self) -> Result<()> {
        self.installs.set(self.installs.get() + 1);
        Ok(())
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
