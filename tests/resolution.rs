// tests/resolution.rs

//! Resolution properties over whole projects.

mod common;

use common::{assert_constraints_hold, react_registry};
use peerup::resolver::{DependencyForest, PackageRecordTable, Resolver};
use peerup::{resolve_project, version, MemoryRegistry, SilentProgress};
use std::collections::HashMap;

fn candidate(forest: &DependencyForest, name: &str) -> String {
    forest
        .node(name)
        .and_then(|n| n.update_candidate.clone())
        .unwrap()
}

#[test]
fn test_react_project_constraints_hold() {
    let reg = react_registry();
    let forest = resolve_project(&reg, &SilentProgress::new()).unwrap();

    assert_eq!(candidate(&forest, "react"), "17.0.2");
    assert_eq!(candidate(&forest, "react-dom"), "17.0.2");
    assert_eq!(candidate(&forest, "react-redux"), "8.0.0");
    assert_constraints_hold(&reg, &forest);
}

#[test]
fn test_dependency_concedes_into_range() {
    let mut reg = MemoryRegistry::new();
    for v in ["1.0.0", "2.0.0", "2.5.0", "3.0.0"] {
        reg.publish("b", v, &[]);
    }
    reg.publish("a", "1.0.0", &[("b", "^2.0.0")])
        .install_version("a", "1.0.0")
        .install_version("b", "1.0.0");

    let forest = resolve_project(&reg, &SilentProgress::new()).unwrap();
    assert_eq!(candidate(&forest, "b"), "2.5.0");
    assert_eq!(candidate(&forest, "a"), "1.0.0");
}

#[test]
fn test_shared_node_converges_across_roots() {
    // plugin sits in the trees of both core and theme
    let mut reg = MemoryRegistry::new();
    reg.publish("core", "1.0.0", &[])
        .publish("core", "2.0.0", &[])
        .publish("theme", "1.0.0", &[])
        .publish("theme", "2.0.0", &[])
        .publish("plugin", "1.0.0", &[("core", "^1.0.0"), ("theme", "^1.0.0 || ^2.0.0")])
        .publish("plugin", "1.1.0", &[("core", "^1.0.0 || ^2.0.0"), ("theme", "^1.0.0")])
        .install_version("core", "1.0.0")
        .install_version("theme", "1.0.0")
        .install_version("plugin", "1.0.0");

    let table = PackageRecordTable::from_registry(&reg, &SilentProgress::new()).unwrap();
    let mut forest = DependencyForest::build(&table).unwrap();
    assert_eq!(forest.trees().len(), 2);
    assert_eq!(forest.node_count(), table.len());
    assert!(forest.trees().iter().all(|t| t.contains("plugin")));

    let mut resolver = Resolver::new(&reg, &mut forest);
    resolver.resolve_forest().unwrap();
    let history = resolver.history().to_vec();

    assert_eq!(candidate(&forest, "plugin"), "1.1.0");
    assert_eq!(candidate(&forest, "core"), "2.0.0");
    assert_eq!(candidate(&forest, "theme"), "1.0.0");
    assert_constraints_hold(&reg, &forest);

    // Candidates never move up
    let mut last: HashMap<String, String> = HashMap::new();
    for assignment in &history {
        if let Some(previous) = last.get(&assignment.package) {
            assert_ne!(
                version::compare(&assignment.version, previous).unwrap(),
                std::cmp::Ordering::Greater
            );
        }
        last.insert(assignment.package.clone(), assignment.version.clone());
    }
}

#[test]
fn test_forest_build_is_repeatable() {
    let reg = react_registry();
    let table = PackageRecordTable::from_registry(&reg, &SilentProgress::new()).unwrap();

    let first = DependencyForest::build(&table).unwrap();
    let second = DependencyForest::build(&table).unwrap();

    assert_eq!(first.trees(), second.trees());
    assert_eq!(first.node_count(), 3);
    assert_eq!(first.trees()[0].members(), ["react", "react-dom", "react-redux"]);
}
