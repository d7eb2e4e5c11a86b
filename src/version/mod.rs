// src/version/mod.rs

//! npm version handling and range satisfaction for peer dependencies
//!
//! Versions and ranges follow npm semantics (`^1.2.0`, `~1.2`, `1.x`,
//! `>=1.0.0 <2.0.0`, `^16.8.0 || ^17.0.0`), parsed with `deno_semver`.
//! Version lists coming from the registry are kept as strings; this module
//! is the only place they are parsed and compared.

use crate::error::{Error, Result};
use deno_semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Parse an npm version string such as "2.3.4" or "1.0.0-beta.1"
pub fn parse_version(s: &str) -> Result<Version> {
    Version::parse_from_npm(s.trim())
        .map_err(|e| Error::Version(format!("Invalid version '{}': {}", s, e)))
}

/// Compare two npm version strings by semver precedence
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    Ok(parse_version(a)?.cmp(&parse_version(b)?))
}

/// Sort version strings ascending (oldest first) and drop duplicates
pub fn sort_versions(versions: &mut Vec<String>) -> Result<()> {
    let mut parsed = versions
        .drain(..)
        .map(|v| parse_version(&v).map(|p| (p, v)))
        .collect::<Result<Vec<_>>>()?;

    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    parsed.dedup_by(|a, b| a.0 == b.0);

    versions.extend(parsed.into_iter().map(|(_, v)| v));
    Ok(())
}

/// A version range declared in a package's dependencies or peerDependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    req: VersionReq,
}

impl VersionRange {
    /// Parse an npm range
    ///
    /// Dist-tags ("latest", "next") are rejected: they name a moving target
    /// and cannot be checked against a concrete version.
    pub fn parse(s: &str) -> Result<Self> {
        let req = VersionReq::parse_from_npm(s.trim())
            .map_err(|e| Error::Version(format!("Invalid version range '{}': {}", s, e)))?;

        if let Some(tag) = req.tag() {
            return Err(Error::Version(format!(
                "Version range '{}' is a dist-tag ({}), not a range",
                s, tag
            )));
        }

        Ok(Self { req })
    }

    /// Check whether the version string satisfies this range
    pub fn satisfies(&self, version: &str) -> Result<bool> {
        Ok(self.req.matches(&parse_version(version)?))
    }

    /// Lowest version that can satisfy this range, published or not
    ///
    /// Every lower bound of an npm range is one of the versions written in it,
    /// the next patch/minor/major after an exclusive bound, or 0.0.0. Those
    /// candidates are probed and the smallest match wins. `None` means no
    /// version satisfies the range at all.
    pub fn min_version(&self) -> Option<Version> {
        let mut probes = vec![(0, 0, 0, String::new()), (0, 0, 0, "0".to_string())];
        for (major, minor, patch, pre) in bound_versions(self.as_str()) {
            probes.push((major, minor, patch.saturating_add(1), String::new()));
            probes.push((major, minor.saturating_add(1), 0, String::new()));
            probes.push((major.saturating_add(1), 0, 0, String::new()));
            if !pre.is_empty() {
                probes.push((major, minor, patch, format!("{}.0", pre)));
                probes.push((major, minor, patch, String::new()));
            }
            probes.push((major, minor, patch, pre));
        }

        probes
            .into_iter()
            .filter_map(|(major, minor, patch, pre)| {
                let text = if pre.is_empty() {
                    format!("{}.{}.{}", major, minor, patch)
                } else {
                    format!("{}.{}.{}-{}", major, minor, patch, pre)
                };
                Version::parse_from_npm(&text).ok()
            })
            .filter(|v| self.req.matches(v))
            .min()
    }

    /// Check whether `version` sorts below every version this range accepts
    pub fn is_below(&self, version: &str) -> Result<bool> {
        let version = parse_version(version)?;
        Ok(match self.min_version() {
            Some(min) => version < min,
            None => false,
        })
    }

    /// The range as written in the package metadata
    pub fn as_str(&self) -> &str {
        self.req.version_text()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Versions written in a range, padded to major.minor.patch
///
/// Operators are stripped and wildcards end the version ("1.x" -> 1.0.0).
/// A prerelease tag is kept only on fully specified versions.
fn bound_versions(range: &str) -> Vec<(u64, u64, u64, String)> {
    range
        .split(|c: char| c.is_whitespace() || c == '|')
        .filter_map(|token| {
            let token = token.trim_start_matches(['<', '>', '=', '^', '~', 'v', 'V']);
            let token = token.split('+').next().unwrap_or_default();
            let (core, pre) = match token.split_once('-') {
                Some((core, pre)) => (core, pre),
                None => (token, ""),
            };

            let mut parts = Vec::with_capacity(3);
            for part in core.split('.') {
                match part.parse::<u64>() {
                    Ok(n) => parts.push(n),
                    Err(_) => break,
                }
            }
            if parts.is_empty() || parts.len() > 3 {
                return None;
            }

            let pre = if parts.len() == 3 { pre.to_string() } else { String::new() };
            parts.resize(3, 0);
            Some((parts[0], parts[1], parts[2], pre))
        })
        .collect()
}

/// How a resolved version is written back into the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePrefix {
    /// "2.3.4"
    #[default]
    Exact,
    /// "^2.3.4"
    Caret,
    /// "~2.3.4"
    Tilde,
}

impl RangePrefix {
    /// Build the policy from the caret/tilde switches; tilde wins when both are set
    pub fn from_flags(caret: bool, tilde: bool) -> Self {
        if tilde {
            RangePrefix::Tilde
        } else if caret {
            RangePrefix::Caret
        } else {
            RangePrefix::Exact
        }
    }

    /// Apply the prefix to a concrete version
    pub fn apply(&self, version: &str) -> String {
        match self {
            RangePrefix::Exact => version.to_string(),
            RangePrefix::Caret => format!("^{}", version),
            RangePrefix::Tilde => format!("~{}", version),
        }
    }
}

impl fmt::Display for RangePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangePrefix::Exact => write!(f, "exact"),
            RangePrefix::Caret => write!(f, "caret"),
            RangePrefix::Tilde => write!(f, "tilde"),
        }
    }
}
