use crate::domain::version::PluginVersion;
use crate::error::{ReleaseError, Result};
use regex::Regex;

/// Prefix stripped from tags that arrive as full ref names
const TAG_REF_PREFIX: &str = "refs/tags/";

/// A composite release tag split into its parts
///
/// Tags take the form `<plugin>/v<version>`, e.g. `my-plugin/v1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub plugin_name: String,
    pub version: String,
    pub is_prerelease: bool,
    pub plugin_version: PluginVersion,
}

impl ParsedTag {
    /// Parse a raw tag string
    ///
    /// The tag must contain exactly one `/`, a non-empty plugin name, and a
    /// version segment starting with `v` followed by a numeric core.
    pub fn parse(raw: &str) -> Result<Self> {
        let tag = raw.trim();
        let tag = tag.strip_prefix(TAG_REF_PREFIX).unwrap_or(tag);

        let separators = tag.matches('/').count();
        if separators != 1 {
            return Err(ReleaseError::malformed_tag(
                raw,
                format!(
                    "expected exactly one '/' between plugin name and version, found {}",
                    separators
                ),
            ));
        }

        let (name, version_segment) = tag.split_once('/').unwrap_or((tag, ""));

        if name.is_empty() {
            return Err(ReleaseError::malformed_tag(raw, "plugin name is empty"));
        }

        let version = version_segment.strip_prefix('v').ok_or_else(|| {
            ReleaseError::malformed_tag(raw, "version segment must start with 'v'")
        })?;

        let plugin_version = PluginVersion::parse(version).map_err(|e| match e {
            ReleaseError::MalformedTag { reason, .. } => ReleaseError::malformed_tag(raw, reason),
            other => other,
        })?;

        Ok(ParsedTag {
            plugin_name: name.to_string(),
            version: version.to_string(),
            is_prerelease: plugin_version.is_prerelease(),
            plugin_version,
        })
    }

    /// The canonical tag name, without any ref prefix
    pub fn tag_name(&self) -> String {
        TagPattern::for_plugin(&self.plugin_name).format(&self.version)
    }
}

/// Tag naming pattern for a single plugin (`<plugin>/v{version}`)
#[derive(Debug, Clone)]
pub struct TagPattern {
    plugin: String,
}

impl TagPattern {
    pub fn for_plugin(plugin: impl Into<String>) -> Self {
        TagPattern {
            plugin: plugin.into(),
        }
    }

    /// Format a version according to pattern
    /// Example: plugin="foo", version="1.2.3" -> "foo/v1.2.3"
    pub fn format(&self, version: &str) -> String {
        format!("{}/v{}", self.plugin, version)
    }

    /// Extract the version from a tag belonging to this plugin
    ///
    /// Returns `Ok(None)` when the tag belongs to another plugin, and an error
    /// when it belongs to this plugin but its version does not parse.
    pub fn match_version(&self, tag: &str) -> Result<Option<PluginVersion>> {
        let pattern = format!("^{}/v(.+)$", regex::escape(&self.plugin));
        let re = Regex::new(&pattern)
            .map_err(|e| ReleaseError::malformed_tag(tag, format!("invalid pattern: {}", e)))?;

        match re.captures(tag) {
            Some(captures) => PluginVersion::parse(&captures[1]).map(Some),
            None => Ok(None),
        }
    }
}
