use std::fmt;

/// Warnings that occur when resolving release history near its boundaries.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No earlier tag exists for this plugin; notes cover the full history
    NoPreviousTag { plugin: String },
    /// No commits touched the artifact in the release range
    NoChanges { plugin: String, path: String },
    /// A tag for this plugin exists but its version cannot be parsed
    UnparsableTag { tag: String, reason: String },
    /// The artifact's manifest header declares a different version than the tag
    ManifestVersionMismatch {
        path: String,
        tag_version: String,
        manifest_version: String,
    },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoPreviousTag { plugin } => {
                write!(
                    f,
                    "No previous tag for plugin '{}'; using full history",
                    plugin
                )
            }
            BoundaryWarning::NoChanges { plugin, path } => {
                write!(
                    f,
                    "No commits touching '{}' for plugin '{}' in this release",
                    path, plugin
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Skipping tag '{}': {}", tag, reason)
            }
            BoundaryWarning::ManifestVersionMismatch {
                path,
                tag_version,
                manifest_version,
            } => {
                write!(
                    f,
                    "{} declares version {} but the tag is {}",
                    path, manifest_version, tag_version
                )
            }
        }
    }
}
