// src/manifest/mod.rs

//! Project manifest access
//!
//! The planner reads and rewrites declared dependency versions through
//! [`ManifestStore`]. [`PackageJson`] is the store for npm projects: it edits
//! the `devDependencies` and `dependencies` sections of `package.json` and
//! leaves every other key untouched and in its original order.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sections searched for a declared version, in lookup order
const SECTIONS: [&str; 2] = ["devDependencies", "dependencies"];

/// Declared dependency versions of a project
pub trait ManifestStore {
    /// Version string declared for `name`, if any
    fn declared_version(&self, name: &str) -> Option<String>;

    /// Replace the declared version of `name`
    ///
    /// Fails when the package is not declared at all.
    fn set_declared_version(&mut self, name: &str, version: &str) -> Result<()>;

    /// Persist pending changes
    fn save(&self) -> Result<()>;
}

/// `package.json` loaded into memory
#[derive(Debug, Clone)]
pub struct PackageJson {
    path: PathBuf,
    document: Map<String, Value>,
}

impl PackageJson {
    /// Read and parse the manifest at `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse manifest content that will be saved to `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let document = match serde_json::from_str(content)? {
            Value::Object(map) => map,
            _ => {
                return Err(Error::Manifest(format!(
                    "{} is not a JSON object",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Manifest as written by `save`
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.document)?;
        out.push('\n');
        Ok(out)
    }

    fn section(&self, section: &str) -> Option<&Map<String, Value>> {
        self.document.get(section).and_then(Value::as_object)
    }
}

impl ManifestStore for PackageJson {
    fn declared_version(&self, name: &str) -> Option<String> {
        SECTIONS
            .iter()
            .filter_map(|s| self.section(s))
            .find_map(|deps| deps.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set_declared_version(&mut self, name: &str, version: &str) -> Result<()> {
        let mut updated = false;
        for section in SECTIONS {
            let Some(deps) = self.document.get_mut(section).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(entry) = deps.get_mut(name) {
                debug!("{}: {} -> {} in {}", name, entry, version, section);
                *entry = Value::String(version.to_string());
                updated = true;
            }
        }

        if updated {
            Ok(())
        } else {
            Err(Error::Manifest(format!(
                "{} is declared in neither devDependencies nor dependencies of {}",
                name,
                self.path.display()
            )))
        }
    }

    fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_json_string()?)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}
