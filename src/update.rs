// src/update.rs

//! End-to-end update workflow
//!
//! Resolve, plan, write the manifest, reinstall. Each stage is skipped when
//! the previous one leaves nothing to do.

use crate::error::Result;
use crate::manifest::ManifestStore;
use crate::progress::ProgressTracker;
use crate::registry::RegistryClient;
use crate::resolver::{self, UpdatePlan};
use crate::version::RangePrefix;
use tracing::info;

/// Knobs for one update run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    pub prefix: RangePrefix,
    /// Plan only; never write or install
    pub dry_run: bool,
    /// Run `npm install` after the manifest was written
    pub install: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            prefix: RangePrefix::Exact,
            dry_run: false,
            install: true,
        }
    }
}

/// What an update run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub plan: UpdatePlan,
    pub written: bool,
    pub installed: bool,
}

/// Run the full update against a registry and manifest
pub fn run_update(
    registry: &dyn RegistryClient,
    manifest: &mut dyn ManifestStore,
    progress: &dyn ProgressTracker,
    options: UpdateOptions,
) -> Result<UpdateOutcome> {
    let mut forest = resolver::resolve_project(registry, progress)?;
    let plan = UpdatePlan::build(&mut forest, &*manifest, options.prefix)?;

    let mut outcome = UpdateOutcome {
        plan,
        ..Default::default()
    };

    if outcome.plan.is_empty() {
        info!("Nothing to do");
        return Ok(outcome);
    }
    if options.dry_run {
        info!("Dry run: package.json left unchanged");
        return Ok(outcome);
    }

    outcome.plan.apply(manifest)?;
    outcome.written = true;

    if options.install {
        registry.install()?;
        outcome.installed = true;
    }
    Ok(outcome)
}
