// src/config.rs

//! Optional `peerup.toml` settings
//!
//! ```toml
//! [update]
//! prefix = "caret"     # exact | caret | tilde
//! install = true
//!
//! [npm]
//! command = "/usr/bin/npm"
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

use crate::error::Result;
use crate::version::RangePrefix;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the project directory when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "peerup.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub npm: NpmConfig,
}

/// `[update]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    /// Prefix written in front of updated versions
    #[serde(default)]
    pub prefix: Option<RangePrefix>,

    /// Run `npm install` after the manifest was written
    #[serde(default)]
    pub install: Option<bool>,
}

/// `[npm]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpmConfig {
    /// npm executable to run instead of the one on PATH
    #[serde(default)]
    pub command: Option<PathBuf>,
}

impl Config {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the explicit config file, or `peerup.toml` in `project_dir` if present
    ///
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        let default_path = project_dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            debug!("Loading config from {}", default_path.display());
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether to run `npm install` after writing the manifest
    pub fn install(&self) -> bool {
        self.update.install.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
[update]
prefix = "tilde"
install = false

[npm]
command = "/opt/node/bin/npm"
"#,
        )
        .unwrap();

        assert_eq!(config.update.prefix, Some(RangePrefix::Tilde));
        assert!(!config.install());
        assert_eq!(
            config.npm.command.as_deref(),
            Some(Path::new("/opt/node/bin/npm"))
        );
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.update.prefix, None);
        assert!(config.install());
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        let err = Config::from_toml("[update]\nprefix = \"wildcard\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("[update]\nprefx = \"caret\"\n").is_err());
    }

    #[test]
    fn test_load_default_file_from_project_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(None, dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[update]\nprefix = \"caret\"\n").unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.update.prefix, Some(RangePrefix::Caret));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing), dir.path()),
            Err(Error::Io(_))
        ));
    }
}
