//! Domain logic - pure release rules independent of git and the filesystem

pub mod commit;
pub mod manifest;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use commit::{ChangelogEntry, ReleaseNotes, NO_CHANGES_PLACEHOLDER};
pub use manifest::PluginManifest;
pub use prerelease::{PreRelease, PreReleaseType};
pub use tag::{ParsedTag, TagPattern};
pub use version::PluginVersion;
