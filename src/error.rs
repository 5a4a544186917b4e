use thiserror::Error;

/// Unified error type for release metadata resolution
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Malformed tag '{tag}': {reason}")]
    MalformedTag { tag: String, reason: String },

    #[error("No artifact found for plugin '{plugin}' under '{root}'")]
    ArtifactNotFound { plugin: String, root: String },

    #[error("Ambiguous artifact for plugin '{plugin}': {}", .candidates.join(", "))]
    AmbiguousArtifact {
        plugin: String,
        candidates: Vec<String>,
    },

    #[error(
        "Version mismatch for plugin '{plugin}': tag says {tag_version}, {path} declares {manifest_version}"
    )]
    VersionMismatch {
        plugin: String,
        path: String,
        tag_version: String,
        manifest_version: String,
    },

    #[error("History unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in plugin-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a malformed tag error for the given input
    pub fn malformed_tag(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        ReleaseError::MalformedTag {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create a history error with context
    pub fn history(msg: impl Into<String>) -> Self {
        ReleaseError::HistoryUnavailable(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Name of the resolution stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            ReleaseError::MalformedTag { .. } => "tag parser",
            ReleaseError::ArtifactNotFound { .. }
            | ReleaseError::AmbiguousArtifact { .. }
            | ReleaseError::VersionMismatch { .. } => "artifact locator",
            ReleaseError::HistoryUnavailable(_) => "changelog generator",
            ReleaseError::Config(_) => "configuration",
            ReleaseError::Io(_) => "i/o",
        }
    }
}

impl From<serde_json::Error> for ReleaseError {
    fn from(err: serde_json::Error) -> Self {
        ReleaseError::Io(err.into())
    }
}

impl From<git2::Error> for ReleaseError {
    fn from(err: git2::Error) -> Self {
        ReleaseError::HistoryUnavailable(err.message().to_string())
    }
}
