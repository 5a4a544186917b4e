use plugin_release::cli::{resolve, ReleaseMetadata};
use plugin_release::boundary::BoundaryWarning;
use plugin_release::config::{Config, ManifestCheck};
use plugin_release::domain::NO_CHANGES_PLACEHOLDER;
use plugin_release::git::MockRepository;
use plugin_release::locator::MemoryTree;
use plugin_release::ReleaseError;
use std::path::PathBuf;

const INJECTOR: &str = include_str!("fixtures/system_prompt_injector.py");
const INJECTOR_PATH: &str = "plugins/filters/system_prompt_injector.py";

fn injector_repo(tag: &str) -> MockRepository {
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add injector", &[], &[INJECTOR_PATH]).unwrap();
    repo.add_tag(tag, a);
    repo
}

fn resolve_with(
    tag: &str,
    paths: &[&str],
    repo: &MockRepository,
) -> plugin_release::Result<ReleaseMetadata> {
    let tree = MemoryTree::from_paths(paths.iter().copied());
    resolve(tag, &tree, repo, &Config::default())
}

#[test]
fn test_resolve_full_release() {
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add foo", &[], &["plugins/foo/main.py"]).unwrap();
    repo.add_tag("foo/v1.0.0", a);
    let b = repo
        .add_commit("Handle empty input", &[a], &["plugins/foo/main.py"])
        .unwrap();
    repo.add_tag("foo/v1.1.0", b);

    let meta = resolve_with("foo/v1.1.0", &["plugins/foo/main.py"], &repo).unwrap();

    assert_eq!(meta.plugin_name, "foo");
    assert_eq!(meta.version, "1.1.0");
    assert!(!meta.is_prerelease);
    assert_eq!(meta.plugin_path, "plugins/foo");
    assert_eq!(meta.previous_tag.as_deref(), Some("foo/v1.0.0"));
    assert_eq!(meta.changelog_body.lines().count(), 1);
    assert!(meta.changelog_body.starts_with("- Handle empty input ("));
}

#[test]
fn test_resolve_prerelease_from_ref_name() {
    let mut repo = MockRepository::new();
    let a = repo
        .add_commit("Add injector", &[], &["plugins/filters/my_plugin.py"])
        .unwrap();
    repo.add_tag("my-plugin/v1.1.0rc1", a);

    let meta = resolve_with(
        "refs/tags/my-plugin/v1.1.0rc1",
        &["plugins/filters/my_plugin.py", "plugins/pipes/other.py"],
        &repo,
    )
    .unwrap();

    assert!(meta.is_prerelease);
    assert_eq!(meta.plugin_path, "plugins/filters/my_plugin.py");
    assert_eq!(meta.previous_tag, None);
}

#[test]
fn test_resolve_empty_changelog_placeholder() {
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add foo", &[], &["plugins/foo.py"]).unwrap();
    repo.add_tag("foo/v1.0.0", a);
    let b = repo.add_commit("Docs only", &[a], &["README.md"]).unwrap();
    repo.add_tag("foo/v1.0.1", b);

    let meta = resolve_with("foo/v1.0.1", &["plugins/foo.py"], &repo).unwrap();
    assert_eq!(meta.changelog_body, NO_CHANGES_PLACEHOLDER);
    assert!(!meta.warnings.is_empty());
}

#[test]
fn test_resolve_malformed_tag_stops_before_other_stages() {
    let mut repo = MockRepository::new();
    repo.set_unavailable("must not be queried");

    let err = resolve_with("invalid-tag", &["plugins/foo.py"], &repo).unwrap_err();
    assert!(matches!(err, ReleaseError::MalformedTag { .. }));
    assert_eq!(err.stage(), "tag parser");
}

#[test]
fn test_resolve_artifact_not_found() {
    let repo = MockRepository::new();
    let err = resolve_with("foo/v1.0.0", &["plugins/bar.py"], &repo).unwrap_err();
    assert!(matches!(err, ReleaseError::ArtifactNotFound { .. }));
    assert_eq!(err.stage(), "artifact locator");
}

#[test]
fn test_resolve_ambiguous_artifact() {
    let repo = MockRepository::new();
    let err = resolve_with(
        "bar/v1.0.0",
        &["plugins/filters/bar.py", "plugins/pipes/bar.py"],
        &repo,
    )
    .unwrap_err();
    assert!(matches!(err, ReleaseError::AmbiguousArtifact { .. }));
}

#[test]
fn test_resolve_history_unavailable() {
    let mut repo = MockRepository::new();
    repo.set_unavailable("object database unreadable");

    let err = resolve_with("foo/v1.0.0", &["plugins/foo.py"], &repo).unwrap_err();
    assert!(matches!(err, ReleaseError::HistoryUnavailable(_)));
    assert_eq!(err.stage(), "changelog generator");
}

#[test]
fn test_resolve_reads_manifest_title() {
    let repo = injector_repo("system_prompt_injector/v0.6.0");
    let tree = MemoryTree::default().with_file(INJECTOR_PATH, INJECTOR);

    let meta = resolve(
        "system_prompt_injector/v0.6.0",
        &tree,
        &repo,
        &Config::default(),
    )
    .unwrap();

    assert_eq!(meta.plugin_title.as_deref(), Some("Advanced Prompt Injector"));
    assert!(!meta
        .warnings
        .iter()
        .any(|w| matches!(w, BoundaryWarning::ManifestVersionMismatch { .. })));
}

#[test]
fn test_resolve_warns_on_manifest_version_mismatch() {
    let repo = injector_repo("system_prompt_injector/v0.7.0");
    let tree = MemoryTree::default().with_file(INJECTOR_PATH, INJECTOR);

    let meta = resolve(
        "system_prompt_injector/v0.7.0",
        &tree,
        &repo,
        &Config::default(),
    )
    .unwrap();

    assert!(meta.warnings.contains(&BoundaryWarning::ManifestVersionMismatch {
        path: INJECTOR_PATH.to_string(),
        tag_version: "0.7.0".to_string(),
        manifest_version: "0.6.0".to_string(),
    }));
}

#[test]
fn test_resolve_fails_on_manifest_version_mismatch_when_strict() {
    let repo = injector_repo("system_prompt_injector/v0.7.0");
    let tree = MemoryTree::default().with_file(INJECTOR_PATH, INJECTOR);
    let mut config = Config::default();
    config.artifact.manifest_version_check = ManifestCheck::Error;

    let err = resolve("system_prompt_injector/v0.7.0", &tree, &repo, &config).unwrap_err();
    assert!(matches!(err, ReleaseError::VersionMismatch { .. }));
    assert_eq!(err.stage(), "artifact locator");
}

#[test]
fn test_resolve_finds_artifact_by_manifest_id() {
    let path = "plugins/filters/injector_v2.py";
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add injector", &[], &[path]).unwrap();
    repo.add_tag("system_prompt_injector/v0.6.0", a);
    let tree = MemoryTree::default().with_file(path, INJECTOR);

    let meta = resolve(
        "system_prompt_injector/v0.6.0",
        &tree,
        &repo,
        &Config::default(),
    )
    .unwrap();
    assert_eq!(meta.plugin_path, path);
}

#[test]
fn test_resolve_rejects_plugins_root_outside_repository() {
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add foo", &[], &["shared/foo.py"]).unwrap();
    repo.add_tag("foo/v1.0.0", a);
    let tree = MemoryTree::from_paths(["shared/foo.py"]);

    for root in ["../shared", "/abs/shared"] {
        let mut config = Config::default();
        config.artifact.plugins_root = PathBuf::from(root);

        let err = resolve("foo/v1.0.0", &tree, &repo, &config).unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)), "{}", root);
        assert_eq!(err.stage(), "configuration");
    }
}

#[test]
fn test_resolve_dot_prefixed_plugins_root_matches_history() {
    let mut repo = MockRepository::new();
    let a = repo.add_commit("Add foo", &[], &["shared/foo.py"]).unwrap();
    repo.add_tag("foo/v1.0.0", a);
    let tree = MemoryTree::from_paths(["shared/foo.py"]);
    let mut config = Config::default();
    config.artifact.plugins_root = PathBuf::from("./shared");

    let meta = resolve("foo/v1.0.0", &tree, &repo, &config).unwrap();
    assert_eq!(meta.plugin_path, "shared/foo.py");
    assert!(meta.changelog_body.starts_with("- Add foo ("));
}
