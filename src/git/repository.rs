use crate::error::{ReleaseError, Result};
use crate::git::{path_touches, CommitInfo};
use git2::{Commit, DiffOptions, Oid, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ReleaseError::history(format!(
                "Not in a git repository '{}': {}",
                path.display(),
                e.message()
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree, or the git directory for bare repositories
    pub fn root(&self) -> PathBuf {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .to_path_buf()
    }

    fn touches(&self, commit: &Commit<'_>, path: &Path) -> Result<bool> {
        let tree = commit.tree()?;

        if commit.parent_count() == 0 {
            if path.as_os_str().is_empty() {
                return Ok(true);
            }
            return Ok(tree.get_path(path).is_ok());
        }

        let parent_tree = commit.parent(0)?.tree()?;

        let mut opts = DiffOptions::new();
        if !path.as_os_str().is_empty() {
            opts.pathspec(path);
        }

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut opts))?;

        // The pathspec narrows the diff; component matching keeps `foo` from matching `foobar`
        let touched = diff.deltas().any(|delta| {
            [delta.new_file().path(), delta.old_file().path()]
                .into_iter()
                .flatten()
                .any(|changed| path_touches(changed, path))
        });

        Ok(touched)
    }
}

impl super::History for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let commit = reference.peel_to_commit().map_err(|e| {
                    ReleaseError::history(format!(
                        "Cannot peel tag '{}' to a commit: {}",
                        tag_name,
                        e.message()
                    ))
                })?;

                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::history(format!(
                "Cannot find tag '{}': {}",
                tag_name,
                e.message()
            ))),
        }
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }

        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn commits_touching(
        &self,
        path: &Path,
        since: Option<Oid>,
        until: Oid,
    ) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(until)?;

        if let Some(since) = since {
            revwalk.hide(since)?;
        }

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            if !self.touches(&commit, path)? {
                continue;
            }

            let message = commit.message().unwrap_or("(empty message)").to_string();

            commits.push(CommitInfo {
                hash: oid.to_string(),
                message,
                parent_count: commit.parent_count(),
            });
        }

        Ok(commits)
    }
}
