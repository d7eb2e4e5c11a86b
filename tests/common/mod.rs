// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use peerup::{MemoryRegistry, PackageJson, RegistryClient, VersionRange};
use peerup::resolver::DependencyForest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a package.json declaring `deps` under "dependencies".
///
/// Returns (TempDir, manifest path) - keep the TempDir alive to prevent cleanup.
pub fn write_manifest(deps: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("package.json");

    let entries: Vec<String> = deps
        .iter()
        .map(|(name, version)| format!("    \"{}\": \"{}\"", name, version))
        .collect();
    let content = format!(
        "{{\n  \"name\": \"app\",\n  \"private\": true,\n  \"dependencies\": {{\n{}\n  }}\n}}\n",
        entries.join(",\n")
    );
    std::fs::write(&path, content).unwrap();

    (temp_dir, path)
}

pub fn load_manifest(path: &Path) -> PackageJson {
    PackageJson::load(path).unwrap()
}

/// A React project installed at 17 with the 18 line published.
///
/// react-dom and react-redux peer-depend on react; the newest react-redux
/// still caps react at 17.
pub fn react_registry() -> MemoryRegistry {
    let mut reg = MemoryRegistry::new();
    reg.publish("react", "16.14.0", &[])
        .publish("react", "17.0.2", &[])
        .publish("react", "18.2.0", &[])
        .publish("react-dom", "17.0.2", &[("react", "17.0.2")])
        .publish("react-dom", "18.2.0", &[("react", "^18.2.0")])
        .publish("react-redux", "7.2.9", &[("react", "^16.8.3 || ^17 || ^18")])
        .publish("react-redux", "8.0.0", &[("react", "^16.8 || ^17.0")])
        .install_version("react", "17.0.2")
        .install_version("react-dom", "17.0.2")
        .install_version("react-redux", "7.2.9");
    reg
}

/// Assert every resolved package's peer ranges accept the peers' candidates
pub fn assert_constraints_hold(registry: &dyn RegistryClient, forest: &DependencyForest) {
    for node in forest.nodes() {
        let version = node
            .update_candidate
            .as_deref()
            .unwrap_or_else(|| panic!("{} has no candidate", node.name));
        let info = registry.info(&format!("{}@{}", node.name, version)).unwrap();

        for peer in node.depends_on.keys() {
            let range = VersionRange::parse(info.required_range(peer).unwrap()).unwrap();
            let peer_version = forest
                .node(peer)
                .and_then(|n| n.update_candidate.clone())
                .unwrap();
            assert!(
                range.satisfies(&peer_version).unwrap(),
                "{}@{} requires {}@{} but {} was chosen",
                node.name,
                version,
                peer,
                range,
                peer_version
            );
        }
    }
}
