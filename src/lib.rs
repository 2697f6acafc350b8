//! explain-commits - Ask a language model why a git commit was made.
//!
//! # Overview
//!
//! explain-commits resolves one commit, renders each changed file into diff
//! text (summarizing binary, excluded, and undecodable files), sends the
//! commit message and diff to a chat-completion model, and writes
//! `<hash>.diff` and `<hash>.md` transcripts to an output directory.

pub mod error;
pub mod explain;
pub mod git;
pub mod pipeline;
pub mod render;
pub mod transcript;

// Re-export commonly used types
pub use error::{DecodeError, ExplainerError, GitError, PipelineError, TranscriptError};
pub use explain::{ChatCompletionClient, Explainer, ExplainerConfig, Prompt};
pub use git::{AddDeleteMode, ChangeKind, ChangeRecord, CommitInfo};
pub use pipeline::{Pipeline, PipelineOptions, PreparedCommit, RunOutcome};
pub use render::{EncodingStrategy, ExtensionFilter, RenderOptions, RenderedFragment};
pub use transcript::{Transcript, WrittenArtifacts};
