// src/commands/update.rs
//! The update command

use crate::cli::Cli;
use anyhow::{Context, Result};
use peerup::{
    run_update, CliProgress, Config, LogProgress, NpmCli, PackageJson, ProgressTracker,
    RangePrefix, SilentProgress, UpdateOptions, UpdateOutcome,
};
use std::path::Path;
use tracing::info;

/// Resolve the project's dependencies and write the result to package.json
pub fn cmd_update(cli: &Cli) -> Result<()> {
    let project = &cli.project;
    let config = Config::load(cli.config.as_deref(), project)
        .context("Failed to load configuration")?;

    let prefix = if cli.set_caret || cli.set_tilde {
        RangePrefix::from_flags(cli.set_caret, cli.set_tilde)
    } else {
        config.update.prefix.unwrap_or_default()
    };
    let options = UpdateOptions {
        prefix,
        dry_run: cli.dry_run,
        install: !cli.no_install && config.install(),
    };
    info!("Range prefix: {}", options.prefix);

    let npm = match cli.npm.clone().or_else(|| config.npm.command.clone()) {
        Some(program) => NpmCli::with_program(program, project.clone()),
        None => NpmCli::new(project.clone())?,
    };
    info!("Using {}", npm.program().display());

    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| project.join("package.json"));
    let mut manifest = PackageJson::load(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;

    let progress: Box<dyn ProgressTracker> = if cli.quiet {
        Box::new(SilentProgress::new())
    } else if cli.debug {
        Box::new(LogProgress::new("npm info", 0))
    } else {
        Box::new(CliProgress::new("Querying registry", 0))
    };

    let outcome = run_update(&npm, &mut manifest, progress.as_ref(), options).map_err(|e| {
        let context = match e.package() {
            Some(package) => format!("Failed to update {}", package),
            None => "Failed to update dependencies".to_string(),
        };
        anyhow::Error::new(e).context(context)
    })?;
    print_report(&outcome, &manifest_path, cli.dry_run);
    Ok(())
}

fn print_report(outcome: &UpdateOutcome, manifest_path: &Path, dry_run: bool) {
    if outcome.plan.is_empty() {
        println!("All dependencies are up to date, nothing to do");
        return;
    }

    println!("{} package(s) to update:", outcome.plan.len());
    for update in &outcome.plan.updates {
        println!("  {}", update);
    }

    if dry_run {
        println!("\nDry run: {} was not modified", manifest_path.display());
        return;
    }
    if outcome.written {
        println!("\nUpdated {}", manifest_path.display());
    }
    if outcome.installed {
        println!("Ran npm install");
    } else {
        println!("Skipped npm install; run it to apply the new versions");
    }
}
