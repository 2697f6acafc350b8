//! Commit resolution.

use chrono::{DateTime, Utc};
use git2::{Commit, Oid, Repository};
use tracing::debug;

use crate::error::GitError;

/// Metadata for a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: Oid,
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a CommitInfo from a git2 Commit.
    pub fn from_git2_commit(commit: &Commit) -> Self {
        // Out-of-range commit times fall back to the epoch
        let timestamp = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();

        Self {
            id: commit.id(),
            hash: commit.id().to_string(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: commit.author().name().unwrap_or("unknown").to_string(),
            timestamp,
        }
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    /// Commit date as shown in prompts.
    pub fn date(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// A commit together with its first parent.
#[derive(Debug, Clone)]
pub struct ResolvedCommit {
    pub commit: CommitInfo,
    /// `None` for root commits.
    pub parent: Option<CommitInfo>,
}

/// Resolve a commit reference to a commit and its first parent.
///
/// If `commit_ref` is None, uses the commit HEAD points at.
pub fn resolve_commit(
    repo: &Repository,
    commit_ref: Option<&str>,
) -> Result<ResolvedCommit, GitError> {
    let reference = commit_ref.unwrap_or("HEAD");
    let commit = find_commit(repo, reference)?;

    let parent = if commit.parent_count() > 0 {
        let parent = commit.parent(0).map_err(|source| GitError::ReadCommit {
            hash: commit.id().to_string(),
            source,
        })?;
        Some(CommitInfo::from_git2_commit(&parent))
    } else {
        debug!("Commit {} is a root commit", commit.id());
        None
    };

    Ok(ResolvedCommit {
        commit: CommitInfo::from_git2_commit(&commit),
        parent,
    })
}

/// Look up a commit by hash, branch, tag, or any other revspec.
fn find_commit<'repo>(repo: &'repo Repository, reference: &str) -> Result<Commit<'repo>, GitError> {
    // Full hashes first so a branch named like a hash can't shadow them
    if let Ok(oid) = Oid::from_str(reference)
        && reference.len() == 40
        && let Ok(commit) = repo.find_commit(oid)
    {
        return Ok(commit);
    }

    repo.revparse_single(reference)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|e| GitError::CommitNotFound(reference.to_string(), e))
}
