// src/registry/npm.rs

//! Registry client backed by the `npm` command-line tool
//!
//! Every call runs `npm` in the project directory and parses its `--json`
//! output. Calls block until npm exits.

use super::{InstalledTree, PackageInfo, RegistryClient};
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Environment variable overriding the npm executable
pub const NPM_ENV: &str = "PEERUP_NPM";

/// `npm` subprocess wrapper
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: PathBuf,
    project_dir: PathBuf,
}

impl NpmCli {
    /// Locate npm via `PEERUP_NPM` or `PATH`
    pub fn new(project_dir: impl Into<PathBuf>) -> Result<Self> {
        let program = match std::env::var_os(NPM_ENV) {
            Some(path) => PathBuf::from(path),
            None => which::which("npm").map_err(|e| {
                Error::NotFound(format!("npm executable ({}). Is Node.js installed?", e))
            })?,
        };
        Ok(Self::with_program(program, project_dir))
    }

    /// Use an explicit npm executable
    pub fn with_program(program: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            project_dir: project_dir.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!("Running {} {}", self.program.display(), args.join(" "));

        Command::new(&self.program)
            .args(args)
            .current_dir(&self.project_dir)
            .output()
            .map_err(|e| {
                Error::Registry(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })
    }

    fn failed(args: &[&str], output: &Output) -> Error {
        Error::CommandFailed {
            command: format!("npm {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl RegistryClient for NpmCli {
    fn info(&self, spec: &str) -> Result<PackageInfo> {
        let args = ["info", spec, "--json"];
        let output = self.output(&args)?;
        if !output.status.success() {
            return Err(Self::failed(&args, &output));
        }
        parse_info(spec, &output.stdout)
    }

    fn list_installed(&self) -> Result<InstalledTree> {
        let node_modules = self.project_dir.join("node_modules");
        if !node_modules.is_dir() {
            return Err(Error::NotFound(format!(
                "{} does not exist. Run 'npm install' first",
                node_modules.display()
            )));
        }

        let args = ["list", "--json"];
        let output = self.output(&args)?;

        // npm list exits non-zero on peer dependency problems but still
        // prints the tree; only give up when there is nothing to parse.
        match serde_json::from_slice::<InstalledTree>(&output.stdout) {
            Ok(tree) => Ok(tree),
            Err(_) if !output.status.success() => Err(Self::failed(&args, &output)),
            Err(e) => Err(e.into()),
        }
    }

    fn install(&self) -> Result<()> {
        info!("Running npm install in {}", self.project_dir.display());
        let args = ["install"];
        let output = self.output(&args)?;
        if !output.status.success() {
            return Err(Self::failed(&args, &output));
        }
        Ok(())
    }
}

/// Parse `npm info --json` output
///
/// A range query prints an array with one document per matching version;
/// the last (newest) one is used.
fn parse_info(spec: &str, stdout: &[u8]) -> Result<PackageInfo> {
    let value: Value = serde_json::from_slice(stdout)?;
    let document = match value {
        Value::Array(mut docs) => docs
            .pop()
            .ok_or_else(|| Error::Registry(format!("npm info {} returned no versions", spec)))?,
        Value::Object(_) => value,
        other => {
            return Err(Error::Registry(format!(
                "Unexpected npm info output for {}: {}",
                spec, other
            )));
        }
    };
    Ok(serde_json::from_value(document)?)
}
