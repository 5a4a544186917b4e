//! Version-control history abstraction
//!
//! This module provides a trait-based abstraction over the history queries
//! the changelog generator needs, allowing for a real Git repository and an
//! in-memory implementation for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory commit graph for tests
//!
//! # Usage
//!
//! ```rust
//! # use plugin_release::git::History;
//! # use std::path::Path;
//! # fn example<H: History>(repo: &H) -> plugin_release::Result<()> {
//! if let Some(head) = repo.resolve_tag("foo/v1.1.0")? {
//!     let commits = repo.commits_touching(Path::new("plugins/foo"), None, head)?;
//!     println!("{} commits", commits.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;
use std::path::Path;

/// Commit information for changelog rendering
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The commit message
    pub message: String,
    /// Number of parents; more than one means a merge commit
    pub parent_count: usize,
}

impl CommitInfo {
    pub fn is_merge(&self) -> bool {
        self.parent_count > 1
    }
}

/// History queries used by the changelog generator
///
/// All methods return [crate::error::Result<T>]; implementations map
/// underlying failures to [crate::error::ReleaseError::HistoryUnavailable].
pub trait History {
    /// Get all tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Resolve a tag to the commit it points at
    ///
    /// Annotated tags are peeled to their target commit.
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - Commit the tag points at
    /// * `Ok(None)` - If the tag doesn't exist
    /// * `Err` - If the lookup fails
    fn resolve_tag(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// Whether `ancestor` is reachable from `descendant` (or is the same commit)
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Get commits touching `path` that are reachable from `until` but not from `since`
    ///
    /// `since` is exclusive and `until` inclusive; with no `since` the full
    /// history reachable from `until` is considered. Commits are returned
    /// newest first.
    ///
    /// # Arguments
    /// * `path` - Path relative to the repository root; directories match everything beneath them
    /// * `since` - Lower bound commit (excluded along with its ancestors)
    /// * `until` - Upper bound commit (included)
    fn commits_touching(
        &self,
        path: &Path,
        since: Option<Oid>,
        until: Oid,
    ) -> Result<Vec<CommitInfo>>;
}

/// Whether a changed file path falls at or beneath `target`
pub(crate) fn path_touches(changed: &Path, target: &Path) -> bool {
    target.as_os_str().is_empty() || changed.starts_with(target)
}
