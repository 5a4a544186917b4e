use crate::config::ChangelogConfig;

/// Line emitted when a release has no recorded commits
pub const NO_CHANGES_PLACEHOLDER: &str = "No changes recorded";

/// A single commit line in the release notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub commit_hash: String,
    pub summary: String,
}

impl ChangelogEntry {
    /// Build an entry from a full commit message, keeping its first non-blank line
    pub fn from_message(commit_hash: impl Into<String>, message: &str) -> Self {
        let summary = message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("(empty message)")
            .to_string();

        ChangelogEntry {
            commit_hash: commit_hash.into(),
            summary,
        }
    }

    /// Abbreviated commit hash, at most `len` characters
    pub fn short_hash(&self, len: usize) -> &str {
        let end = self
            .commit_hash
            .char_indices()
            .nth(len)
            .map(|(i, _)| i)
            .unwrap_or(self.commit_hash.len());
        &self.commit_hash[..end]
    }

    pub fn render(&self, config: &ChangelogConfig) -> String {
        if config.include_hash {
            format!(
                "- {} ({})",
                self.summary,
                self.short_hash(config.short_hash_len)
            )
        } else {
            format!("- {}", self.summary)
        }
    }
}

/// Release notes for one plugin release, newest entry first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseNotes {
    /// Tag the notes start after; `None` means full history
    pub previous_tag: Option<String>,
    pub entries: Vec<ChangelogEntry>,
}

impl ReleaseNotes {
    pub fn new(previous_tag: Option<String>, entries: Vec<ChangelogEntry>) -> Self {
        ReleaseNotes {
            previous_tag,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render as release body text, or the placeholder line when empty
    pub fn render(&self, config: &ChangelogConfig) -> String {
        if self.entries.is_empty() {
            return NO_CHANGES_PLACEHOLDER.to_string();
        }

        self.entries
            .iter()
            .map(|entry| entry.render(config))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
