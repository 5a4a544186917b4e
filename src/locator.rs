//! Artifact discovery
//!
//! Finds the file or directory under the plugins root that makes up a
//! plugin's distributable artifact. The repository tree is reached through
//! the [FileTree] trait so the ranking rules can be tested against an
//! in-memory tree.

use crate::boundary::BoundaryWarning;
use crate::config::{ArtifactConfig, ManifestCheck};
use crate::domain::{ParsedTag, PluginManifest, PluginVersion};
use crate::error::{ReleaseError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File extensions whose sources may open with a manifest header
const MANIFEST_EXTENSIONS: &[&str] = &["py"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One child of a directory, with its path relative to the tree root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Name compared against the plugin name: file stem for files, full name for directories
    pub fn match_name(&self) -> Option<&str> {
        let name = match self.kind {
            EntryKind::File => self.path.file_stem(),
            EntryKind::Dir => self.path.file_name(),
        };
        name.and_then(|n| n.to_str())
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Traversable view of a repository tree
pub trait FileTree {
    /// Whether `dir` exists as a directory
    fn is_dir(&self, dir: &Path) -> bool;

    /// Direct children of `dir`, sorted by path
    fn children(&self, dir: &Path) -> Result<Vec<TreeEntry>>;

    /// Text content of the file at `path`, or `None` if it is missing or not UTF-8
    fn read_to_string(&self, path: &Path) -> Result<Option<String>>;
}

/// [FileTree] backed by the local filesystem
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsTree { root: root.into() }
    }
}

impl FileTree for FsTree {
    fn is_dir(&self, dir: &Path) -> bool {
        self.root.join(dir).is_dir()
    }

    fn children(&self, dir: &Path) -> Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(self.root.join(dir))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };

            entries.push(TreeEntry {
                path: dir.join(entry.file_name()),
                kind,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(self.root.join(path)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::InvalidData) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory [FileTree] built from a list of paths
///
/// Paths ending in `/` are directories; parent directories are implied.
/// Files added through [MemoryTree::with_file] also carry content.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    entries: BTreeMap<PathBuf, EntryKind>,
    contents: BTreeMap<PathBuf, String>,
}

impl MemoryTree {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = MemoryTree::default();
        for raw in paths {
            tree.insert(raw.as_ref());
        }
        tree
    }

    /// Add a file with the given content
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let path = self.insert(path);
        self.contents.insert(path, content.to_string());
        self
    }

    fn insert(&mut self, raw: &str) -> PathBuf {
        let kind = if raw.ends_with('/') {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        let path = PathBuf::from(raw.trim_end_matches('/'));

        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.entries.insert(ancestor.to_path_buf(), EntryKind::Dir);
        }
        self.entries.entry(path.clone()).or_insert(kind);
        path
    }
}

impl FileTree for MemoryTree {
    fn is_dir(&self, dir: &Path) -> bool {
        dir.as_os_str().is_empty() || self.entries.get(dir) == Some(&EntryKind::Dir)
    }

    fn children(&self, dir: &Path) -> Result<Vec<TreeEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, kind)| TreeEntry {
                path: path.clone(),
                kind: *kind,
            })
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.contents.get(path).cloned())
    }
}

/// How well an entry name matches the plugin name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Name starts with the plugin name followed by a separator
    Prefix,
    /// Name equals the plugin name
    Exact,
}

fn normalize(name: &str, normalize_separators: bool) -> String {
    if normalize_separators {
        name.replace('-', "_")
    } else {
        name.to_string()
    }
}

/// Rank `name` against `plugin`, or `None` when it does not match
pub fn rank_name(name: &str, plugin: &str, normalize_separators: bool) -> Option<MatchRank> {
    let name = normalize(name, normalize_separators);
    let plugin = normalize(plugin, normalize_separators);

    if name == plugin {
        return Some(MatchRank::Exact);
    }

    match name.strip_prefix(plugin.as_str()) {
        Some(rest) if rest.starts_with(['-', '_', '.']) => Some(MatchRank::Prefix),
        _ => None,
    }
}

/// Locates a plugin's artifact within a [FileTree]
pub struct ArtifactLocator<'a, T: FileTree> {
    tree: &'a T,
    config: &'a ArtifactConfig,
}

impl<'a, T: FileTree> ArtifactLocator<'a, T> {
    pub fn new(tree: &'a T, config: &'a ArtifactConfig) -> Self {
        ArtifactLocator { tree, config }
    }

    /// Find the single best-ranked artifact for `plugin_name`
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Artifact path relative to the repository root
    /// * `Err(ArtifactNotFound)` - If nothing under the plugins root matches
    /// * `Err(AmbiguousArtifact)` - If several entries share the best rank
    pub fn locate(&self, plugin_name: &str) -> Result<PathBuf> {
        let root = &self.plugins_root();
        let not_found = || ReleaseError::ArtifactNotFound {
            plugin: plugin_name.to_string(),
            root: root.display().to_string(),
        };

        if !self.tree.is_dir(root) {
            log::debug!("Plugins root '{}' does not exist", root.display());
            return Err(not_found());
        }

        let candidates = self.candidates(plugin_name)?;

        let best = match candidates.iter().map(|(rank, _)| *rank).max() {
            Some(best) => best,
            None => return Err(not_found()),
        };

        let mut winners: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|(rank, _)| *rank == best)
            .map(|(_, path)| path)
            .collect();

        if winners.len() > 1 {
            return Err(ReleaseError::AmbiguousArtifact {
                plugin: plugin_name.to_string(),
                candidates: winners.iter().map(|p| p.display().to_string()).collect(),
            });
        }

        let artifact = winners.remove(0);
        log::debug!(
            "Located artifact for '{}' ({:?} match): {}",
            plugin_name,
            best,
            artifact.display()
        );
        Ok(artifact)
    }

    /// Read the manifest header of a file artifact
    ///
    /// Directories and files without a manifest-bearing extension have none.
    pub fn manifest(&self, artifact: &Path) -> Result<Option<PluginManifest>> {
        let supported = artifact
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext));

        if !supported {
            return Ok(None);
        }

        Ok(self
            .tree
            .read_to_string(artifact)?
            .as_deref()
            .and_then(PluginManifest::parse))
    }

    /// Compare the manifest's declared version with the release tag
    ///
    /// # Returns
    /// * `Ok(None)` - If the versions agree, the manifest has no version, or the check is off
    /// * `Ok(Some(warning))` - On a mismatch with [ManifestCheck::Warn]
    /// * `Err(VersionMismatch)` - On a mismatch with [ManifestCheck::Error]
    pub fn check_manifest_version(
        &self,
        tag: &ParsedTag,
        artifact: &Path,
        manifest: &PluginManifest,
    ) -> Result<Option<BoundaryWarning>> {
        let check = self.config.manifest_version_check;
        let declared = match manifest.version() {
            Some(declared) if check != ManifestCheck::Off => declared,
            _ => return Ok(None),
        };

        let agrees = PluginVersion::parse(declared)
            .map(|version| version == tag.plugin_version)
            .unwrap_or(false);

        if agrees {
            return Ok(None);
        }

        let path = artifact.display().to_string();
        log::debug!(
            "Manifest of {} declares {}, tag is {}",
            path,
            declared,
            tag.version
        );

        match check {
            ManifestCheck::Error => Err(ReleaseError::VersionMismatch {
                plugin: tag.plugin_name.clone(),
                path,
                tag_version: tag.version.clone(),
                manifest_version: declared.to_string(),
            }),
            _ => Ok(Some(BoundaryWarning::ManifestVersionMismatch {
                path,
                tag_version: tag.version.clone(),
                manifest_version: declared.to_string(),
            })),
        }
    }

    /// Configured plugins root without `.` components
    fn plugins_root(&self) -> PathBuf {
        self.config
            .plugins_root
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// Whether a file's manifest header declares `id: <plugin_name>`
    fn manifest_id_matches(&self, entry: &TreeEntry, plugin_name: &str) -> Result<bool> {
        if entry.kind != EntryKind::File || !self.config.match_manifest_id {
            return Ok(false);
        }

        let id_rank = self.manifest(&entry.path)?.and_then(|manifest| {
            manifest
                .id()
                .and_then(|id| rank_name(id, plugin_name, self.config.normalize_separators))
        });
        Ok(id_rank == Some(MatchRank::Exact))
    }

    /// Walk the plugins root collecting every matching entry
    fn candidates(&self, plugin_name: &str) -> Result<Vec<(MatchRank, PathBuf)>> {
        let mut found = Vec::new();
        let mut stack = vec![self.plugins_root()];

        while let Some(dir) = stack.pop() {
            for entry in self.tree.children(&dir)? {
                let file_name = entry.file_name();
                if file_name.starts_with('.') || self.config.ignore.iter().any(|i| i == file_name)
                {
                    continue;
                }

                let mut rank = entry.match_name().and_then(|name| {
                    rank_name(name, plugin_name, self.config.normalize_separators)
                });

                if rank != Some(MatchRank::Exact) && self.manifest_id_matches(&entry, plugin_name)? {
                    log::debug!("{} declares id '{}'", entry.path.display(), plugin_name);
                    rank = Some(MatchRank::Exact);
                }

                if let Some(rank) = rank {
                    found.push((rank, entry.path.clone()));
                }

                // An exactly matching directory is the artifact itself
                if entry.kind == EntryKind::Dir && rank != Some(MatchRank::Exact) {
                    stack.push(entry.path);
                }
            }
        }

        found.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(paths: &[&str], plugin: &str) -> Result<PathBuf> {
        let tree = MemoryTree::from_paths(paths.iter().copied());
        let config = ArtifactConfig::default();
        ArtifactLocator::new(&tree, &config).locate(plugin)
    }

    #[test]
    fn test_rank_name() {
        assert_eq!(rank_name("foo", "foo", true), Some(MatchRank::Exact));
        assert_eq!(rank_name("foo_v2", "foo", true), Some(MatchRank::Prefix));
        assert_eq!(rank_name("foo.min", "foo", true), Some(MatchRank::Prefix));
        assert_eq!(rank_name("foobar", "foo", true), None);
        assert_eq!(rank_name("bar", "foo", true), None);
    }

    #[test]
    fn test_rank_name_separator_normalization() {
        assert_eq!(
            rank_name("my_plugin", "my-plugin", true),
            Some(MatchRank::Exact)
        );
        assert_eq!(rank_name("my_plugin", "my-plugin", false), None);
    }

    #[test]
    fn test_locate_single_directory() {
        let path = locate(&["plugins/foo/", "plugins/other.py"], "foo").unwrap();
        assert_eq!(path, PathBuf::from("plugins/foo"));
    }

    #[test]
    fn test_locate_nested_file() {
        let path = locate(
            &[
                "plugins/filters/system_prompt_injector.py",
                "plugins/pipes/gemini_manifold.py",
            ],
            "system-prompt-injector",
        )
        .unwrap();
        assert_eq!(
            path,
            PathBuf::from("plugins/filters/system_prompt_injector.py")
        );
    }

    #[test]
    fn test_locate_exact_directory_hides_its_contents() {
        let path = locate(&["plugins/foo/foo.py", "plugins/foo/util.py"], "foo").unwrap();
        assert_eq!(path, PathBuf::from("plugins/foo"));
    }

    #[test]
    fn test_locate_exact_beats_prefix() {
        let path = locate(&["plugins/bar.py", "plugins/bar_legacy.py"], "bar").unwrap();
        assert_eq!(path, PathBuf::from("plugins/bar.py"));
    }

    #[test]
    fn test_locate_ambiguous() {
        let err = locate(&["plugins/filters/bar.py", "plugins/pipes/bar.py"], "bar").unwrap_err();
        match err {
            ReleaseError::AmbiguousArtifact { candidates, .. } => {
                assert_eq!(
                    candidates,
                    vec![
                        "plugins/filters/bar.py".to_string(),
                        "plugins/pipes/bar.py".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_locate_ambiguous_prefix_only() {
        let err = locate(&["plugins/bar-a.py", "plugins/bar-b.py"], "bar").unwrap_err();
        assert!(matches!(err, ReleaseError::AmbiguousArtifact { .. }));
    }

    #[test]
    fn test_locate_not_found() {
        let err = locate(&["plugins/foo.py"], "bar").unwrap_err();
        assert!(matches!(err, ReleaseError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_locate_missing_plugins_root() {
        let err = locate(&["src/foo.py"], "foo").unwrap_err();
        assert!(matches!(err, ReleaseError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_locate_outside_plugins_root_ignored() {
        let path = locate(&["plugins/foo.py", "docs/foo.md"], "foo").unwrap();
        assert_eq!(path, PathBuf::from("plugins/foo.py"));
    }

    #[test]
    fn test_locate_skips_ignored_and_hidden() {
        let path = locate(
            &[
                "plugins/foo.py",
                "plugins/__pycache__/foo.cpython-312.pyc",
                "plugins/.cache/foo.py",
            ],
            "foo",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("plugins/foo.py"));
    }

    #[test]
    fn test_memory_tree_children() {
        let tree = MemoryTree::from_paths(["plugins/a/b.py", "plugins/c.py"]);
        let children = tree.children(Path::new("plugins")).unwrap();
        assert_eq!(
            children,
            vec![
                TreeEntry {
                    path: PathBuf::from("plugins/a"),
                    kind: EntryKind::Dir
                },
                TreeEntry {
                    path: PathBuf::from("plugins/c.py"),
                    kind: EntryKind::File
                },
            ]
        );
    }

    const HEADER: &str = "\"\"\"\ntitle: Advanced Prompt Injector\nid: system_prompt_injector\nversion: 0.6.0\n\"\"\"\n\nimport json\n";

    fn check(tree: &MemoryTree, config: &ArtifactConfig, tag: &str) -> Result<Option<BoundaryWarning>> {
        let locator = ArtifactLocator::new(tree, config);
        let tag = ParsedTag::parse(tag).unwrap();
        let artifact = locator.locate(&tag.plugin_name)?;
        let manifest = locator.manifest(&artifact)?.unwrap();
        locator.check_manifest_version(&tag, &artifact, &manifest)
    }

    #[test]
    fn test_locate_by_manifest_id() {
        let tree = MemoryTree::from_paths(["plugins/pipes/other.py"])
            .with_file("plugins/filters/injector.py", HEADER);
        let config = ArtifactConfig::default();

        let path = ArtifactLocator::new(&tree, &config)
            .locate("system-prompt-injector")
            .unwrap();
        assert_eq!(path, PathBuf::from("plugins/filters/injector.py"));

        let config = ArtifactConfig {
            match_manifest_id: false,
            ..ArtifactConfig::default()
        };
        let err = ArtifactLocator::new(&tree, &config)
            .locate("system-prompt-injector")
            .unwrap_err();
        assert!(matches!(err, ReleaseError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_manifest_id_and_stem_match_are_ambiguous() {
        let tree = MemoryTree::from_paths(["plugins/system_prompt_injector.py"])
            .with_file("plugins/legacy/old.py", HEADER);
        let config = ArtifactConfig::default();

        let err = ArtifactLocator::new(&tree, &config)
            .locate("system_prompt_injector")
            .unwrap_err();
        assert!(matches!(err, ReleaseError::AmbiguousArtifact { .. }));
    }

    #[test]
    fn test_manifest_version_agrees() {
        let tree = MemoryTree::default().with_file("plugins/filters/system_prompt_injector.py", HEADER);
        let config = ArtifactConfig::default();

        assert_eq!(check(&tree, &config, "system_prompt_injector/v0.6.0").unwrap(), None);
        assert_eq!(check(&tree, &config, "system_prompt_injector/v0.6").unwrap(), None);
    }

    #[test]
    fn test_manifest_version_mismatch_warns_by_default() {
        let tree = MemoryTree::default().with_file("plugins/filters/system_prompt_injector.py", HEADER);
        let config = ArtifactConfig::default();

        let warning = check(&tree, &config, "system_prompt_injector/v0.7.0").unwrap();
        assert_eq!(
            warning,
            Some(BoundaryWarning::ManifestVersionMismatch {
                path: "plugins/filters/system_prompt_injector.py".to_string(),
                tag_version: "0.7.0".to_string(),
                manifest_version: "0.6.0".to_string(),
            })
        );
    }

    #[test]
    fn test_manifest_version_mismatch_modes() {
        let tree = MemoryTree::default().with_file("plugins/filters/system_prompt_injector.py", HEADER);

        let strict = ArtifactConfig {
            manifest_version_check: ManifestCheck::Error,
            ..ArtifactConfig::default()
        };
        let err = check(&tree, &strict, "system_prompt_injector/v0.7.0").unwrap_err();
        assert!(matches!(err, ReleaseError::VersionMismatch { .. }));
        assert_eq!(err.stage(), "artifact locator");

        let off = ArtifactConfig {
            manifest_version_check: ManifestCheck::Off,
            ..ArtifactConfig::default()
        };
        assert_eq!(check(&tree, &off, "system_prompt_injector/v0.7.0").unwrap(), None);
    }

    #[test]
    fn test_manifest_only_read_from_python_files() {
        let tree = MemoryTree::default()
            .with_file("plugins/foo.md", HEADER)
            .with_file("plugins/bar/__init__.py", HEADER);
        let config = ArtifactConfig::default();
        let locator = ArtifactLocator::new(&tree, &config);

        assert_eq!(locator.manifest(Path::new("plugins/foo.md")).unwrap(), None);
        assert_eq!(locator.manifest(Path::new("plugins/bar")).unwrap(), None);
        assert!(locator
            .manifest(Path::new("plugins/bar/__init__.py"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_locate_with_dot_prefixed_root() {
        let tree = MemoryTree::from_paths(["plugins/foo.py"]);
        let config = ArtifactConfig {
            plugins_root: PathBuf::from("./plugins"),
            ..ArtifactConfig::default()
        };

        let path = ArtifactLocator::new(&tree, &config).locate("foo").unwrap();
        assert_eq!(path, PathBuf::from("plugins/foo.py"));
    }

    #[test]
    fn test_fs_tree_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("plugins")).unwrap();
        std::fs::write(dir.path().join("plugins/foo.py"), HEADER).unwrap();
        std::fs::write(dir.path().join("plugins/blob.py"), [0xff, 0xfe, 0x00]).unwrap();

        let tree = FsTree::new(dir.path());
        assert_eq!(
            tree.read_to_string(Path::new("plugins/foo.py")).unwrap().as_deref(),
            Some(HEADER)
        );
        assert_eq!(tree.read_to_string(Path::new("plugins/blob.py")).unwrap(), None);
        assert_eq!(tree.read_to_string(Path::new("plugins/missing.py")).unwrap(), None);
    }
}
