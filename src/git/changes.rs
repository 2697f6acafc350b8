//! Per-file change classification between a commit and its parent.

use std::fmt;

use git2::{
    Delta, Diff, DiffDelta, DiffFile, DiffFindOptions, DiffOptions, FileMode, Oid, Patch, Repository,
    Tree,
};
use tracing::debug;

use crate::error::GitError;

use super::resolve::CommitInfo;

/// Which side(s) of the change a file exists on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Deleted,
    Modified,
}

impl ChangeStatus {
    /// Past-tense verb used in rendered summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a change record. Binary takes precedence over status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Binary,
}

/// How added and deleted files are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AddDeleteMode {
    /// Unified patch text, same as modified files.
    #[default]
    Hunk,
    /// The full new (added) or old (deleted) file content.
    FullContent,
}

/// One changed file within a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    old_path: Option<String>,
    new_path: Option<String>,
    status: ChangeStatus,
    binary: bool,
    payload: Option<Vec<u8>>,
}

impl ChangeRecord {
    /// Build a record from its paths.
    ///
    /// A missing old path means the file was added, a missing new path means
    /// it was deleted. Returns `None` when both are missing.
    pub fn new(
        old_path: Option<String>,
        new_path: Option<String>,
        binary: bool,
        payload: Option<Vec<u8>>,
    ) -> Option<Self> {
        let status = match (&old_path, &new_path) {
            (None, None) => return None,
            (None, Some(_)) => ChangeStatus::Added,
            (Some(_), None) => ChangeStatus::Deleted,
            (Some(_), Some(_)) => ChangeStatus::Modified,
        };

        Some(Self {
            old_path,
            new_path,
            status,
            binary,
            payload,
        })
    }

    pub fn added(path: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            old_path: None,
            new_path: Some(path.into()),
            status: ChangeStatus::Added,
            binary: false,
            payload: Some(payload.into()),
        }
    }

    pub fn deleted(path: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            old_path: Some(path.into()),
            new_path: None,
            status: ChangeStatus::Deleted,
            binary: false,
            payload: Some(payload.into()),
        }
    }

    pub fn modified(path: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        Self {
            old_path: Some(path.clone()),
            new_path: Some(path),
            status: ChangeStatus::Modified,
            binary: false,
            payload: Some(payload.into()),
        }
    }

    /// Mark the record as carrying non-text content.
    pub fn into_binary(mut self) -> Self {
        self.binary = true;
        self
    }

    pub fn old_path(&self) -> Option<&str> {
        self.old_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&str> {
        self.new_path.as_deref()
    }

    pub fn status(&self) -> ChangeStatus {
        self.status
    }

    pub fn kind(&self) -> ChangeKind {
        if self.binary {
            return ChangeKind::Binary;
        }
        match self.status {
            ChangeStatus::Added => ChangeKind::Added,
            ChangeStatus::Deleted => ChangeKind::Deleted,
            ChangeStatus::Modified => ChangeKind::Modified,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Whether this is a rename that carries no content change.
    pub fn is_pure_rename(&self) -> bool {
        self.payload.is_none() && self.old_path.is_some() && self.old_path != self.new_path
    }

    /// The path a reader cares about: new path unless the file was deleted.
    pub fn effective_path(&self) -> &str {
        match self.status {
            ChangeStatus::Deleted => self.old_path.as_deref().unwrap_or_default(),
            ChangeStatus::Added | ChangeStatus::Modified => {
                self.new_path.as_deref().unwrap_or_default()
            }
        }
    }
}

/// Classify every file changed between `parent` and `commit`.
///
/// Root commits (no parent) have nothing to diff against and yield an empty
/// list. Records follow git's path order.
pub fn classify_changes(
    repo: &Repository,
    parent: Option<&CommitInfo>,
    commit: &CommitInfo,
    mode: AddDeleteMode,
) -> Result<Vec<ChangeRecord>, GitError> {
    let Some(parent) = parent else {
        debug!("No parent for {}, nothing to diff", commit.short_hash());
        return Ok(Vec::new());
    };

    let diff_failed = |source| GitError::DiffFailed {
        hash: commit.hash.clone(),
        source,
    };

    let old_tree = commit_tree(repo, parent)?;
    let new_tree = commit_tree(repo, commit)?;

    let mut opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))
        .map_err(diff_failed)?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts)).map_err(diff_failed)?;

    let mut records = Vec::with_capacity(diff.deltas().len());
    for idx in 0..diff.deltas().len() {
        if let Some(record) = classify_delta(repo, &diff, idx, mode).map_err(diff_failed)? {
            records.push(record);
        }
    }

    debug!(
        "Classified {} changed files in {}",
        records.len(),
        commit.short_hash()
    );

    Ok(records)
}

fn commit_tree<'repo>(repo: &'repo Repository, info: &CommitInfo) -> Result<Tree<'repo>, GitError> {
    repo.find_commit(info.id)
        .and_then(|c| c.tree())
        .map_err(|source| GitError::ReadCommit {
            hash: info.hash.clone(),
            source,
        })
}

/// Build the record for one delta, or `None` for statuses that carry no change.
fn classify_delta(
    repo: &Repository,
    diff: &Diff<'_>,
    idx: usize,
    mode: AddDeleteMode,
) -> Result<Option<ChangeRecord>, git2::Error> {
    // Loading the patch also runs git's binary detection on the delta
    let patch = Patch::from_diff(diff, idx)?;
    let Some(delta) = diff.get_delta(idx) else {
        return Ok(None);
    };

    let path_of = |file: DiffFile<'_>| file.path().map(|p| p.to_string_lossy().into_owned());
    let (old_path, new_path) = match delta.status() {
        Delta::Added | Delta::Copied => (None, path_of(delta.new_file())),
        Delta::Deleted => (path_of(delta.old_file()), None),
        Delta::Modified | Delta::Renamed | Delta::Typechange => {
            (path_of(delta.old_file()), path_of(delta.new_file()))
        }
        other => {
            debug!("Skipping delta with status {:?}", other);
            return Ok(None);
        }
    };

    let binary = patch
        .as_ref()
        .is_some_and(|p| p.delta().flags().is_binary())
        || is_binary_delta(repo, &delta)?;

    let payload = if binary {
        None
    } else {
        match (delta.status(), mode) {
            (Delta::Added | Delta::Copied, AddDeleteMode::FullContent)
                if is_blob(&delta.new_file()) =>
            {
                Some(blob_content(repo, delta.new_file().id())?)
            }
            (Delta::Deleted, AddDeleteMode::FullContent) if is_blob(&delta.old_file()) => {
                Some(blob_content(repo, delta.old_file().id())?)
            }
            (Delta::Renamed, _) if patch.as_ref().is_none_or(|p| p.num_hunks() == 0) => None,
            _ => match patch {
                Some(mut patch) => Some(patch.to_buf()?.to_vec()),
                None => None,
            },
        }
    };

    Ok(ChangeRecord::new(old_path, new_path, binary, payload))
}

/// Check git's binary flag, falling back to inspecting the blobs themselves.
fn is_binary_delta(repo: &Repository, delta: &DiffDelta<'_>) -> Result<bool, git2::Error> {
    if delta.flags().is_binary() {
        return Ok(true);
    }
    for file in [delta.old_file(), delta.new_file()] {
        if is_blob(&file) && !file.id().is_zero() && repo.find_blob(file.id())?.is_binary() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Submodule entries point at commits, not blobs.
fn is_blob(file: &DiffFile<'_>) -> bool {
    !matches!(
        file.mode(),
        FileMode::Commit | FileMode::Tree | FileMode::Unreadable
    )
}

fn blob_content(repo: &Repository, id: Oid) -> Result<Vec<u8>, git2::Error> {
    Ok(repo.find_blob(id)?.content().to_vec())
}
