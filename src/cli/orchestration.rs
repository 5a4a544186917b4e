//! Main workflow orchestration logic
//!
//! Composes the tag parser, artifact locator and changelog generator into a
//! single resolution step. Every stage receives typed values from the stages
//! before it, so the workflow can be called programmatically without
//! depending on clap or the CI environment.

use serde::Serialize;
use std::path::Path;

use crate::boundary::BoundaryWarning;
use crate::changelog::ChangelogGenerator;
use crate::config::Config;
use crate::domain::ParsedTag;
use crate::error::Result;
use crate::git::History;
use crate::locator::{ArtifactLocator, FileTree};

/// Everything the release-publishing step needs for one plugin release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseMetadata {
    pub plugin_name: String,
    pub version: String,
    pub is_prerelease: bool,
    /// Artifact path relative to the repository root, `/`-separated
    pub plugin_path: String,
    pub changelog_body: String,
    pub previous_tag: Option<String>,
    /// `title:` from the artifact's manifest header, when present
    pub plugin_title: Option<String>,

    #[serde(skip)]
    pub warnings: Vec<BoundaryWarning>,
}

/// Resolve release metadata for `tag`
///
/// Runs the three stages in order:
/// 1. Parse the tag into plugin name and version
/// 2. Locate the plugin's artifact in `tree` and check its manifest header
/// 3. Generate release notes from `history` for the artifact path
///
/// The first failure aborts the run; no partial metadata is returned.
///
/// # Arguments
///
/// * `tag` - Raw tag, optionally prefixed with `refs/tags/`
/// * `tree` - Repository tree rooted at the repository root
/// * `history` - Version-control history of the same repository
/// * `config` - Artifact and changelog settings
pub fn resolve<T: FileTree, H: History>(
    tag: &str,
    tree: &T,
    history: &H,
    config: &Config,
) -> Result<ReleaseMetadata> {
    let parsed = ParsedTag::parse(tag)?;
    resolve_parsed(parsed, tree, history, config)
}

/// Run the artifact and changelog stages for an already parsed tag
pub fn resolve_parsed<T: FileTree, H: History>(
    parsed: ParsedTag,
    tree: &T,
    history: &H,
    config: &Config,
) -> Result<ReleaseMetadata> {
    config.validate()?;
    log::info!(
        "Resolving release for plugin '{}' version {}",
        parsed.plugin_name,
        parsed.version
    );

    let locator = ArtifactLocator::new(tree, &config.artifact);
    let artifact = locator.locate(&parsed.plugin_name)?;
    log::info!("Artifact: {}", artifact.display());

    let mut warnings = Vec::new();
    let manifest = locator.manifest(&artifact)?;
    if let Some(manifest) = &manifest {
        warnings.extend(locator.check_manifest_version(&parsed, &artifact, manifest)?);
    }

    let changelog =
        ChangelogGenerator::new(history, &config.changelog).generate(&parsed, &artifact)?;
    warnings.extend(changelog.warnings);

    Ok(ReleaseMetadata {
        plugin_path: to_slash(&artifact),
        changelog_body: changelog.notes.render(&config.changelog),
        previous_tag: changelog.notes.previous_tag,
        plugin_title: manifest.and_then(|m| m.title().map(str::to_string)),
        warnings,
        plugin_name: parsed.plugin_name,
        version: parsed.version,
        is_prerelease: parsed.is_prerelease,
    })
}

fn to_slash(path: &Path) -> String {
    path.iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
