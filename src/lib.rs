// src/lib.rs

//! peerup
//!
//! Updates the direct dependencies of an npm project to the newest versions
//! that still satisfy each other's peer dependency ranges.
//!
//! # Architecture
//!
//! - Registry access behind a trait: `npm` subprocesses in production, an
//!   in-memory registry in tests
//! - Forest of dependency trees, one per root package, sharing one node per
//!   package so every tree sees the same candidate
//! - Resolution starts from the latest versions and only ever concedes to
//!   older ones
//! - Nothing is written until the whole forest resolved

pub mod config;
mod error;
pub mod manifest;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod update;
pub mod version;

pub use config::Config;
pub use error::{Error, Result};
pub use manifest::{ManifestStore, PackageJson};
pub use progress::{CliProgress, LogProgress, ProgressTracker, SilentProgress};
pub use registry::{InstalledTree, MemoryRegistry, NpmCli, PackageInfo, RegistryClient};
pub use resolver::{resolve_project, DependencyForest, PlannedUpdate, Resolver, UpdatePlan};
pub use update::{run_update, UpdateOptions, UpdateOutcome};
pub use version::{RangePrefix, VersionRange};
