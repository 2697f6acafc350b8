//! Persisting diffs and explanation transcripts.

pub mod format;
pub mod writer;

pub use format::Transcript;
pub use writer::{WrittenArtifacts, diff_path, transcript_path, write_artifacts, write_diff, write_transcript};
