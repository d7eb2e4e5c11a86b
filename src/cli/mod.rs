// src/cli/mod.rs
//! CLI definitions for peerup
//!
//! peerup has a single operation: update the project's direct dependencies
//! to the newest versions whose peer requirements agree. The implementation
//! lives in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "peerup")]
#[command(version)]
#[command(
    about = "Update npm dependencies to the newest versions that satisfy each other's peer dependencies",
    long_about = None
)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "debug")]
    pub debug: bool,

    /// Show the updates without writing package.json or installing
    #[arg(long)]
    pub dry_run: bool,

    /// Write updated versions with a caret prefix (^1.2.3)
    #[arg(long)]
    pub set_caret: bool,

    /// Write updated versions with a tilde prefix (~1.2.3); wins over --set-caret
    #[arg(long)]
    pub set_tilde: bool,

    /// Do not run npm install after writing package.json
    #[arg(long)]
    pub no_install: bool,

    /// Project directory containing package.json and node_modules
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Manifest to update (default: <project>/package.json)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Config file (default: <project>/peerup.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// npm executable to run
    #[arg(long, value_name = "PATH")]
    pub npm: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
