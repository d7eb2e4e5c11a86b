// src/registry/mod.rs

//! Package registry access
//!
//! The resolver talks to the registry through [`RegistryClient`]. Two
//! implementations are provided:
//! - [`NpmCli`]: shells out to the `npm` executable of the project
//! - [`MemoryRegistry`]: in-memory package data for tests and offline runs

mod memory;
mod npm;

pub use memory::MemoryRegistry;
pub use npm::NpmCli;

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Metadata for one package version as reported by `npm info --json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub name: String,

    /// Version described by this document (the latest one for an unversioned query)
    pub version: String,

    /// Every published version
    #[serde(default, deserialize_with = "one_or_many")]
    pub versions: Vec<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: BTreeMap<String, String>,
}

impl PackageInfo {
    /// Range this version requires of `dependency`
    ///
    /// A regular dependency range takes precedence over a peer range.
    pub fn required_range(&self, dependency: &str) -> Option<&str> {
        self.dependencies
            .get(dependency)
            .or_else(|| self.peer_dependencies.get(dependency))
            .map(String::as_str)
    }
}

/// Top-level view of `npm list --json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledTree {
    #[serde(default)]
    pub name: Option<String>,

    /// Direct dependencies of the project; absent when npm found none
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, InstalledPackage>>,
}

/// One entry of the installed tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Missing packages are listed without a version
    #[serde(default)]
    pub version: Option<String>,
}

/// Registry operations the resolver depends on
///
/// Calls are made one at a time and in order; later resolution steps read
/// candidates written by earlier ones.
pub trait RegistryClient {
    /// Metadata for `name` (latest version) or `name@version`
    fn info(&self, spec: &str) -> Result<PackageInfo>;

    /// The project's installed dependency tree
    fn list_installed(&self) -> Result<InstalledTree>;

    /// Reinstall the project's dependencies after the manifest changed
    fn install(&self) -> Result<()>;
}

/// Build an `name@version` query string
pub fn package_spec(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Split a query string into name and optional version
///
/// Scoped names keep their leading `@`: "@scope/pkg@1.0.0" gives
/// ("@scope/pkg", Some("1.0.0")).
pub fn split_spec(spec: &str) -> (&str, Option<&str>) {
    let search_from = usize::from(spec.starts_with('@'));
    match spec[search_from..].find('@') {
        Some(pos) => {
            let at = search_from + pos;
            (&spec[..at], Some(&spec[at + 1..]))
        }
        None => (spec, None),
    }
}

/// npm prints a bare string instead of a one-element list in some outputs
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(v) => vec![v],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_spec() {
        assert_eq!(split_spec("react"), ("react", None));
        assert_eq!(split_spec("react@18.2.0"), ("react", Some("18.2.0")));
        assert_eq!(split_spec("@types/react"), ("@types/react", None));
        assert_eq!(
            split_spec("@types/react@18.0.1"),
            ("@types/react", Some("18.0.1"))
        );
    }

    #[test]
    fn test_package_info_from_npm_json() {
        let json = r#"{
            "name": "react-dom",
            "version": "18.2.0",
            "versions": ["17.0.2", "18.2.0"],
            "dependencies": { "scheduler": "^0.23.0" },
            "peerDependencies": { "react": "^18.2.0" }
        }"#;
        let info: PackageInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.version, "18.2.0");
        assert_eq!(info.versions.len(), 2);
        assert_eq!(info.required_range("react"), Some("^18.2.0"));
        assert_eq!(info.required_range("scheduler"), Some("^0.23.0"));
        assert_eq!(info.required_range("vue"), None);
    }

    #[test]
    fn test_single_version_string() {
        let json = r#"{ "name": "solo", "version": "1.0.0", "versions": "1.0.0" }"#;
        let info: PackageInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.versions, vec!["1.0.0".to_string()]);
        assert!(info.peer_dependencies.is_empty());
    }

    #[test]
    fn test_dependency_range_preferred_over_peer() {
        let mut info = PackageInfo::default();
        info.dependencies.insert("b".into(), "^1.0.0".into());
        info.peer_dependencies.insert("b".into(), "^2.0.0".into());
        assert_eq!(info.required_range("b"), Some("^1.0.0"));
    }

    #[test]
    fn test_installed_tree_from_npm_list() {
        let json = r#"{
            "name": "app",
            "dependencies": {
                "react": { "version": "18.2.0", "resolved": "https://registry.npmjs.org/react/-/react-18.2.0.tgz" },
                "left-pad": { "missing": true }
            }
        }"#;
        let tree: InstalledTree = serde_json::from_str(json).unwrap();
        let deps = tree.dependencies.unwrap();
        assert_eq!(deps["react"].version.as_deref(), Some("18.2.0"));
        assert_eq!(deps["left-pad"].version, None);
    }
}
