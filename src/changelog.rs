//! Changelog generation
//!
//! Release notes for `<plugin>/v<version>` list the commits touching the
//! plugin's artifact since the closest earlier release of the same plugin.

use crate::boundary::BoundaryWarning;
use crate::config::ChangelogConfig;
use crate::domain::{ChangelogEntry, ParsedTag, PluginVersion, ReleaseNotes, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::History;
use git2::Oid;
use std::path::Path;

/// Release notes together with the non-fatal issues met while building them
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedChangelog {
    pub notes: ReleaseNotes,
    pub warnings: Vec<BoundaryWarning>,
}

/// Builds release notes from version-control history
pub struct ChangelogGenerator<'a, H: History> {
    history: &'a H,
    config: &'a ChangelogConfig,
}

impl<'a, H: History> ChangelogGenerator<'a, H> {
    pub fn new(history: &'a H, config: &'a ChangelogConfig) -> Self {
        ChangelogGenerator { history, config }
    }

    /// Generate release notes for `current`, covering commits that touch `artifact`
    ///
    /// # Arguments
    /// * `current` - The tag being released
    /// * `artifact` - Artifact path relative to the repository root
    ///
    /// # Returns
    /// * `Ok(GeneratedChangelog)` - Notes newest first; empty notes render as a placeholder
    /// * `Err(HistoryUnavailable)` - If the current tag is missing or a history query fails
    pub fn generate(&self, current: &ParsedTag, artifact: &Path) -> Result<GeneratedChangelog> {
        let tag_name = current.tag_name();
        let current_oid = self
            .history
            .resolve_tag(&tag_name)?
            .ok_or_else(|| ReleaseError::history(format!("Tag '{}' not found", tag_name)))?;

        let mut warnings = Vec::new();
        let previous = self.previous_tag(current, current_oid, &mut warnings)?;

        match &previous {
            Some((name, _)) => log::info!("Generating changelog for {} since {}", tag_name, name),
            None => {
                log::info!("Generating changelog for {} from full history", tag_name);
                warnings.push(BoundaryWarning::NoPreviousTag {
                    plugin: current.plugin_name.clone(),
                });
            }
        }

        let commits = self.history.commits_touching(
            artifact,
            previous.as_ref().map(|(_, oid)| *oid),
            current_oid,
        )?;

        let entries: Vec<ChangelogEntry> = commits
            .iter()
            .filter(|commit| self.config.include_merges || !commit.is_merge())
            .map(|commit| ChangelogEntry::from_message(&commit.hash, &commit.message))
            .collect();

        log::debug!(
            "{} of {} commits touching {} kept",
            entries.len(),
            commits.len(),
            artifact.display()
        );

        if entries.is_empty() {
            warnings.push(BoundaryWarning::NoChanges {
                plugin: current.plugin_name.clone(),
                path: artifact.display().to_string(),
            });
        }

        Ok(GeneratedChangelog {
            notes: ReleaseNotes::new(previous.map(|(name, _)| name), entries),
            warnings,
        })
    }

    /// Find the highest-versioned earlier tag of the same plugin that is an
    /// ancestor of the current tag's commit
    fn previous_tag(
        &self,
        current: &ParsedTag,
        current_oid: Oid,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Option<(String, Oid)>> {
        let pattern = TagPattern::for_plugin(&current.plugin_name);
        let current_name = current.tag_name();
        let mut best: Option<(PluginVersion, String, Oid)> = None;

        for tag in self.history.list_tags()? {
            if tag == current_name {
                continue;
            }

            let version = match pattern.match_version(&tag) {
                Ok(Some(version)) => version,
                Ok(None) => continue,
                Err(e) => {
                    warnings.push(BoundaryWarning::UnparsableTag {
                        tag: tag.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if version >= current.plugin_version {
                log::debug!("Ignoring {}: not older than {}", tag, current_name);
                continue;
            }

            if self.config.skip_prereleases && !current.is_prerelease && version.is_prerelease() {
                log::debug!("Ignoring prerelease {}", tag);
                continue;
            }

            let oid = match self.history.resolve_tag(&tag)? {
                Some(oid) => oid,
                None => continue,
            };

            if !self.history.is_ancestor(oid, current_oid)? {
                log::debug!("Ignoring {}: not an ancestor of {}", tag, current_name);
                continue;
            }

            if best.as_ref().map_or(true, |(v, _, _)| version > *v) {
                best = Some((version, tag, oid));
            }
        }

        Ok(best.map(|(_, name, oid)| (name, oid)))
    }
}
