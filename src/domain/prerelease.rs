//! Prerelease suffix classification
//!
//! Plugin tags carry prerelease markers in several dialects: PEP 440 style
//! (`1.1.0rc1`, `2.0b3`), semver style (`1.0.0-beta.2`) and free-form
//! (`1.0.0-nightly`). This module recognizes the identifier and optional
//! iteration number so prereleases order sensibly against each other.

use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Prerelease identifier type
///
/// Variant order is precedence order: custom identifiers (dev, nightly, ...)
/// sort before alpha, which sorts before beta, then release candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreReleaseType {
    /// Custom prerelease identifier
    Custom(String),
    /// Alpha prerelease
    Alpha,
    /// Beta prerelease
    Beta,
    /// Release candidate
    ReleaseCandidate,
}

impl PreReleaseType {
    /// Parse a prerelease type from a string
    ///
    /// Accepts: "alpha", "a", "beta", "b", "rc", "c", "pre", "preview", or any
    /// custom alphanumeric-hyphen string
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for PreReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alpha" | "a" => Ok(PreReleaseType::Alpha),
            "beta" | "b" => Ok(PreReleaseType::Beta),
            "rc" | "c" | "pre" | "preview" => Ok(PreReleaseType::ReleaseCandidate),
            other => {
                if !other.is_empty() && other.chars().all(|c| c.is_alphanumeric() || c == '-') {
                    Ok(PreReleaseType::Custom(other.to_string()))
                } else {
                    Err(ReleaseError::malformed_tag(
                        s,
                        format!("invalid prerelease identifier '{}'", s),
                    ))
                }
            }
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
            PreReleaseType::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Prerelease marker with optional iteration number
///
/// # Examples
/// - "rc1" -> PreRelease { identifier: ReleaseCandidate, iteration: Some(1) }
/// - "-beta.2" -> PreRelease { identifier: Beta, iteration: Some(2) }
/// - "-nightly" -> PreRelease { identifier: Custom("nightly"), iteration: None }
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreRelease {
    /// The prerelease identifier
    pub identifier: PreReleaseType,
    /// Optional iteration number
    pub iteration: Option<u64>,
}

impl PreRelease {
    pub fn new(identifier: PreReleaseType, iteration: Option<u64>) -> Self {
        PreRelease {
            identifier,
            iteration,
        }
    }

    /// Parse the suffix that follows a version's numeric core
    ///
    /// # Examples
    /// ```ignore
    /// let pr = PreRelease::parse("rc1")?;
    /// assert_eq!(pr.identifier, PreReleaseType::ReleaseCandidate);
    /// assert_eq!(pr.iteration, Some(1));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::malformed_tag(s, "empty prerelease suffix"));
        }

        let re = Regex::new(r"^[-._]?([A-Za-z][A-Za-z-]*?)[-._]?(\d+)?$")
            .map_err(|e| ReleaseError::malformed_tag(s, e.to_string()))?;

        let captures = re.captures(s).ok_or_else(|| {
            ReleaseError::malformed_tag(s, format!("unrecognized prerelease suffix '{}'", s))
        })?;

        let identifier = PreReleaseType::parse(&captures[1])?;

        let iteration = match captures.get(2) {
            Some(m) => Some(m.as_str().parse::<u64>().map_err(|_| {
                ReleaseError::malformed_tag(s, format!("invalid iteration '{}'", m.as_str()))
            })?),
            None => None,
        };

        Ok(PreRelease {
            identifier,
            iteration,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(iter) = self.iteration {
            write!(f, ".{}", iter)?;
        }
        Ok(())
    }
}
