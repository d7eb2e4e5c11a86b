// tests/workflow.rs

//! Update workflow tests: resolve, plan, write package.json, reinstall.

mod common;

use common::{load_manifest, react_registry, write_manifest};
use peerup::{
    run_update, Error, ManifestStore, MemoryRegistry, PlannedUpdate, RangePrefix, SilentProgress,
    UpdateOptions,
};

fn options(prefix: RangePrefix) -> UpdateOptions {
    UpdateOptions {
        prefix,
        ..Default::default()
    }
}

#[test]
fn test_single_root_caret_update() {
    let mut reg = MemoryRegistry::new();
    reg.publish("a", "1.9.0", &[])
        .publish("a", "2.0.0", &[])
        .install_version("a", "1.9.0");
    let (_dir, path) = write_manifest(&[("a", "1.9.0")]);
    let mut manifest = load_manifest(&path);

    let outcome = run_update(&reg, &mut manifest, &SilentProgress::new(), options(RangePrefix::Caret))
        .unwrap();

    assert_eq!(
        outcome.plan.updates,
        vec![PlannedUpdate {
            name: "a".into(),
            current_declared: Some("1.9.0".into()),
            new_version: "^2.0.0".into(),
        }]
    );
    assert!(outcome.written);
    assert!(outcome.installed);
    assert_eq!(reg.install_count(), 1);
    assert_eq!(
        load_manifest(&path).declared_version("a").as_deref(),
        Some("^2.0.0")
    );
}

#[test]
fn test_peer_capped_upgrade() {
    let reg = react_registry();
    let (_dir, path) = write_manifest(&[
        ("react", "17.0.2"),
        ("react-dom", "17.0.2"),
        ("react-redux", "7.2.9"),
    ]);
    let mut manifest = load_manifest(&path);

    let outcome = run_update(&reg, &mut manifest, &SilentProgress::new(), options(RangePrefix::Exact))
        .unwrap();

    // react-redux 8 caps react at 17, which holds react-dom back as well
    assert_eq!(outcome.plan.len(), 1);
    assert_eq!(outcome.plan.updates[0].to_string(), "react-redux: 7.2.9 -> 8.0.0");

    let written = load_manifest(&path);
    assert_eq!(written.declared_version("react").as_deref(), Some("17.0.2"));
    assert_eq!(written.declared_version("react-dom").as_deref(), Some("17.0.2"));
    assert_eq!(written.declared_version("react-redux").as_deref(), Some("8.0.0"));
}

#[test]
fn test_dry_run_leaves_manifest_alone() {
    let reg = react_registry();
    let (_dir, path) = write_manifest(&[
        ("react", "17.0.2"),
        ("react-dom", "17.0.2"),
        ("react-redux", "7.2.9"),
    ]);
    let before = std::fs::read_to_string(&path).unwrap();
    let mut manifest = load_manifest(&path);

    let outcome = run_update(
        &reg,
        &mut manifest,
        &SilentProgress::new(),
        UpdateOptions {
            prefix: RangePrefix::Tilde,
            dry_run: true,
            install: true,
        },
    )
    .unwrap();

    assert_eq!(outcome.plan.len(), 3);
    assert!(!outcome.written);
    assert!(!outcome.installed);
    assert_eq!(reg.install_count(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_nothing_to_do() {
    let mut reg = MemoryRegistry::new();
    reg.publish("a", "1.0.0", &[])
        .publish("b", "2.0.0", &[("a", "^1.0.0")])
        .install_version("a", "1.0.0")
        .install_version("b", "2.0.0");
    let (_dir, path) = write_manifest(&[("a", "1.0.0"), ("b", "2.0.0")]);
    let mut manifest = load_manifest(&path);

    let outcome = run_update(&reg, &mut manifest, &SilentProgress::new(), options(RangePrefix::Exact))
        .unwrap();

    assert!(outcome.plan.is_empty());
    assert!(!outcome.written);
    assert_eq!(reg.install_count(), 0);
}

#[test]
fn test_install_can_be_skipped() {
    let mut reg = MemoryRegistry::new();
    reg.publish("a", "1.0.0", &[])
        .publish("a", "1.1.0", &[])
        .install_version("a", "1.0.0");
    let (_dir, path) = write_manifest(&[("a", "1.0.0")]);
    let mut manifest = load_manifest(&path);

    let outcome = run_update(
        &reg,
        &mut manifest,
        &SilentProgress::new(),
        UpdateOptions {
            install: false,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(outcome.written);
    assert!(!outcome.installed);
    assert_eq!(reg.install_count(), 0);
}

#[test]
fn test_unresolvable_peer_fails_without_writing() {
    let mut reg = MemoryRegistry::new();
    reg.publish("b", "3.0.0", &[])
        .publish("a", "1.0.0", &[("b", "^2.0.0")])
        .install_version("a", "1.0.0")
        .install_version("b", "3.0.0");
    let (_dir, path) = write_manifest(&[("a", "1.0.0"), ("b", "3.0.0")]);
    let before = std::fs::read_to_string(&path).unwrap();
    let mut manifest = load_manifest(&path);

    let err = run_update(&reg, &mut manifest, &SilentProgress::new(), UpdateOptions::default())
        .unwrap_err();

    match err {
        Error::NoCandidate { package, .. } => assert_eq!(package, "b"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(reg.install_count(), 0);
}

#[test]
fn test_dev_dependency_updated() {
    let mut reg = MemoryRegistry::new();
    reg.publish("typescript", "5.3.3", &[])
        .publish("typescript", "5.4.5", &[])
        .install_version("typescript", "5.3.3");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.json");
    std::fs::write(
        &path,
        "{\n  \"name\": \"app\",\n  \"devDependencies\": {\n    \"typescript\": \"~5.3.3\"\n  }\n}\n",
    )
    .unwrap();
    let mut manifest = load_manifest(&path);

    run_update(&reg, &mut manifest, &SilentProgress::new(), options(RangePrefix::Tilde)).unwrap();

    assert_eq!(
        load_manifest(&path).declared_version("typescript").as_deref(),
        Some("~5.4.5")
    );
}
