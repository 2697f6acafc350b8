//! Git operations using git2-rs.

pub mod changes;
pub mod resolve;

pub use changes::{AddDeleteMode, ChangeKind, ChangeRecord, ChangeStatus, classify_changes};
pub use resolve::{CommitInfo, ResolvedCommit, resolve_commit};

use std::path::Path;

use git2::Repository;

use crate::error::GitError;

/// Open the repository at `path`, searching parent directories.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(|source| GitError::OpenRepository {
        path: path.to_path_buf(),
        source,
    })
}
