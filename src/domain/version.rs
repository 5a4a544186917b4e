use crate::domain::prerelease::PreRelease;
use crate::error::{ReleaseError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Plugin version as written in a release tag
///
/// A numeric core (`1`, `1.2`, `1.2.3`, ...) optionally followed by a
/// non-numeric suffix (`rc1`, `-beta.2`, `.dev0`). Any suffix marks the
/// version as a prerelease.
#[derive(Debug, Clone)]
pub struct PluginVersion {
    core: Vec<u64>,
    suffix: Option<String>,
}

impl PluginVersion {
    /// Parse a version string without the leading `v`
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Numeric components of the version core
    pub fn core(&self) -> &[u64] {
        &self.core
    }

    /// Raw suffix following the numeric core, if any
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.suffix.is_some()
    }

    /// Classify the suffix, when it follows a recognizable shape
    pub fn prerelease(&self) -> Option<PreRelease> {
        self.suffix.as_deref().and_then(|s| PreRelease::parse(s).ok())
    }

    /// Convert to a `semver::Version`, padding missing core components with zero
    ///
    /// Returns `None` when the core has more than three components or the
    /// suffix is not a valid semver prerelease.
    pub fn to_semver(&self) -> Option<semver::Version> {
        if self.core.len() > 3 {
            return None;
        }
        let part = |i: usize| self.core.get(i).copied().unwrap_or(0);
        let mut version = semver::Version::new(part(0), part(1), part(2));
        if let Some(suffix) = &self.suffix {
            version.pre = semver::Prerelease::new(trim_separators(suffix)).ok()?;
        }
        Some(version)
    }

    fn cmp_core(&self, other: &Self) -> Ordering {
        let len = self.core.len().max(other.core.len());
        for i in 0..len {
            let a = self.core.get(i).copied().unwrap_or(0);
            let b = other.core.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    fn cmp_suffix(&self, other: &Self) -> Ordering {
        match (&self.suffix, &other.suffix) {
            (None, None) => Ordering::Equal,
            // A prerelease precedes the release of the same core
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match (self.prerelease(), other.prerelease()) {
                (Some(pa), Some(pb)) => pa.cmp(&pb),
                // Recognized prerelease markers precede free-form suffixes
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => cmp_free_form(a, b),
            },
        }
    }
}

/// Order unclassified suffixes: valid semver prereleases first, by semver
/// precedence, then the rest by string
fn cmp_free_form(a: &str, b: &str) -> Ordering {
    let sa = semver::Prerelease::new(trim_separators(a));
    let sb = semver::Prerelease::new(trim_separators(b));
    match (sa, sb) {
        (Ok(sa), Ok(sb)) => sa.cmp(&sb),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_start_matches(['-', '.', '_'])
}

impl FromStr for PluginVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let core_end = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (core_str, rest) = s.split_at(core_end);

        // A trailing dot belongs to the suffix (e.g. "1.0.0.dev1")
        let (core_str, rest) = match core_str.strip_suffix('.') {
            Some(trimmed) if !rest.is_empty() => (trimmed, &s[trimmed.len()..]),
            _ => (core_str, rest),
        };

        if core_str.is_empty() {
            return Err(ReleaseError::malformed_tag(
                s,
                "version must start with a numeric component",
            ));
        }

        let core = core_str
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| {
                ReleaseError::malformed_tag(s, format!("invalid numeric core '{}'", core_str))
            })?;

        let suffix = if rest.is_empty() {
            None
        } else if rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '+'))
        {
            Some(rest.to_string())
        } else {
            return Err(ReleaseError::malformed_tag(
                s,
                format!("invalid characters in version suffix '{}'", rest),
            ));
        };

        Ok(PluginVersion { core, suffix })
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_core(other).then_with(|| self.cmp_suffix(other))
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.core.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", core.join("."))?;
        if let Some(suffix) = &self.suffix {
            write!(f, "{}", suffix)?;
        }
        Ok(())
    }
}
