//! Error types for explain-commits modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository at {path}: {source}")]
    OpenRepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Commit '{0}' not found in repository history: {1}")]
    CommitNotFound(String, #[source] git2::Error),

    #[error("Failed to read commit {hash}: {source}")]
    ReadCommit {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to diff commit {hash} against its parent: {source}")]
    DiffFailed {
        hash: String,
        #[source]
        source: git2::Error,
    },
}

/// A single file's diff could not be decoded as text.
///
/// Always recoverable: the renderer turns it into an elided fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("content is not valid UTF-8")]
    InvalidUtf8,

    #[error("no confident encoding guess for content")]
    UnknownEncoding,

    #[error("content is malformed for detected encoding {0}")]
    Malformed(&'static str),
}

/// Errors from the chat-completion explainer.
#[derive(Error, Debug)]
pub enum ExplainerError {
    #[error("No API key configured. Set the OPENAI_API_KEY environment variable or use --diff-only")]
    MissingApiKey,

    #[error("Failed to reach the model service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Rate limited by the model service{}", retry_after.as_ref().map(|r| format!(" (retry after {r})")).unwrap_or_default())]
    RateLimited { retry_after: Option<String> },

    #[error("Model service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model service returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Model service returned an empty response")]
    EmptyResponse,
}

impl ExplainerError {
    /// Whether rerunning the command later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExplainerError::Transport(_)
                | ExplainerError::RateLimited { .. }
                | ExplainerError::Timeout(_)
        ) || matches!(self, ExplainerError::Api { status, .. } if *status >= 500)
    }
}

/// Errors from writing output artifacts.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by a whole pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Write(#[from] TranscriptError),

    /// The explainer failed after the diff artifact was persisted.
    #[error("Explanation failed ({} kept): {source}", diff_path.display())]
    Explain {
        diff_path: PathBuf,
        #[source]
        source: ExplainerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_includes_retry_after() {
        let err = ExplainerError::RateLimited {
            retry_after: Some("20".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Rate limited by the model service (retry after 20)"
        );

        let err = ExplainerError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "Rate limited by the model service");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ExplainerError::Timeout(30).is_retryable());
        assert!(ExplainerError::RateLimited { retry_after: None }.is_retryable());
        assert!(
            ExplainerError::Api {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ExplainerError::Api {
                status: 401,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!ExplainerError::MissingApiKey.is_retryable());
    }

    #[test]
    fn test_write_failed_names_path() {
        let err = TranscriptError::WriteFailed {
            path: PathBuf::from("/out/abc.md"),
            source: std::io::Error::other("disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/out/abc.md"));
        assert!(msg.contains("disk full"));
    }
}
