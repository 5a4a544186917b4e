use crate::error::{ReleaseError, Result};
use crate::git::{path_touches, CommitInfo, History};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct MockCommit {
    oid: Oid,
    info: CommitInfo,
    parents: Vec<Oid>,
    paths: Vec<PathBuf>,
}

/// In-memory commit graph for testing without actual git operations
///
/// Commits are kept in insertion order, which is treated as chronological.
#[derive(Debug, Default)]
pub struct MockRepository {
    commits: Vec<MockCommit>,
    tags: HashMap<String, Oid>,
    unavailable: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit touching `paths` with the given parents and return its OID
    pub fn add_commit(&mut self, message: &str, parents: &[Oid], paths: &[&str]) -> Result<Oid> {
        let oid = Oid::from_str(&format!("{:040x}", self.commits.len() + 1))?;

        self.commits.push(MockCommit {
            oid,
            info: CommitInfo {
                hash: oid.to_string(),
                message: message.to_string(),
                parent_count: parents.len(),
            },
            parents: parents.to_vec(),
            paths: paths.iter().map(PathBuf::from).collect(),
        });

        Ok(oid)
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.insert(name.into(), oid);
    }

    /// Make every subsequent query fail with the given message
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    fn check_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(reason) => Err(ReleaseError::history(reason.clone())),
            None => Ok(()),
        }
    }

    fn find(&self, oid: Oid) -> Result<&MockCommit> {
        self.commits
            .iter()
            .find(|c| c.oid == oid)
            .ok_or_else(|| ReleaseError::history(format!("Unknown commit {}", oid)))
    }

    fn reachable(&self, from: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut stack = vec![from];

        while let Some(oid) = stack.pop() {
            if seen.insert(oid) {
                stack.extend(self.find(oid)?.parents.iter().copied());
            }
        }

        Ok(seen)
    }
}

impl History for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        self.check_available()?;
        let mut tags: Vec<String> = self.tags.keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<Option<Oid>> {
        self.check_available()?;
        Ok(self.tags.get(tag_name).copied())
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        self.check_available()?;
        Ok(self.reachable(descendant)?.contains(&ancestor))
    }

    fn commits_touching(
        &self,
        path: &Path,
        since: Option<Oid>,
        until: Oid,
    ) -> Result<Vec<CommitInfo>> {
        self.check_available()?;

        let included = self.reachable(until)?;
        let excluded = match since {
            Some(since) => self.reachable(since)?,
            None => HashSet::new(),
        };

        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|c| included.contains(&c.oid) && !excluded.contains(&c.oid))
            .filter(|c| c.paths.iter().any(|changed| path_touches(changed, path)))
            .map(|c| c.info.clone())
            .collect())
    }
}
