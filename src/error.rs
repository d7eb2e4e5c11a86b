// src/error.rs

//! Error types for peer dependency resolution and manifest updates

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a resolution run
///
/// Every variant is fatal for the run. Nothing is written to the manifest
/// before resolution has finished, so an error never leaves a partial update.
#[derive(Error, Debug)]
pub enum Error {
    /// A package referenced by an edge is missing from the record table,
    /// or a node was left without a candidate
    #[error("Dependency graph integrity error: {0}")]
    GraphIntegrity(String),

    /// Forced lowering found no acceptable older version
    #[error("No candidate version for {package}: {reason}")]
    NoCandidate { package: String, reason: String },

    /// A candidate's metadata no longer declares a range for a tracked peer
    #[error(
        "{dependency} should be a dependency or peerDependency of {package}@{version}, \
         but no version range was found in its metadata"
    )]
    MissingRange {
        package: String,
        version: String,
        dependency: String,
    },

    /// Tracked peer dependencies form a cycle
    #[error("Peer dependencies form a cycle that cannot be resolved: {}", cycle.join(" -> "))]
    UnresolvableCycle { cycle: Vec<String> },

    /// Registry returned unusable data
    #[error("Registry error: {0}")]
    Registry(String),

    /// External command exited unsuccessfully
    #[error("Command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Manifest could not be read or updated
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// A required file, directory or package was not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unparseable version or version range
    #[error("Version error: {0}")]
    Version(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Package name the error is about, when there is one
    pub fn package(&self) -> Option<&str> {
        match self {
            Error::NoCandidate { package, .. } | Error::MissingRange { package, .. } => {
                Some(package)
            }
            _ => None,
        }
    }
}
