//! Atomic writes of diff and transcript artifacts.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::TranscriptError;

use super::format::Transcript;

/// Paths of the files written for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub diff_path: PathBuf,
    pub transcript_path: Option<PathBuf>,
}

/// `<output_dir>/<commit_id>.diff`
pub fn diff_path(output_dir: &Path, commit_id: &str) -> PathBuf {
    output_dir.join(format!("{}.diff", commit_id))
}

/// `<output_dir>/<commit_id>.md`
pub fn transcript_path(output_dir: &Path, commit_id: &str) -> PathBuf {
    output_dir.join(format!("{}.md", commit_id))
}

/// Write the diff artifact and, when it has a response, the transcript.
pub fn write_artifacts(
    output_dir: &Path,
    commit_id: &str,
    diff_text: &str,
    transcript: Option<&Transcript>,
) -> Result<WrittenArtifacts, TranscriptError> {
    let diff_path = write_diff(output_dir, commit_id, diff_text)?;
    let transcript_path = match transcript {
        Some(transcript) => write_transcript(output_dir, commit_id, transcript)?,
        None => None,
    };

    Ok(WrittenArtifacts {
        diff_path,
        transcript_path,
    })
}

/// Write `<commit_id>.diff`.
pub fn write_diff(
    output_dir: &Path,
    commit_id: &str,
    diff_text: &str,
) -> Result<PathBuf, TranscriptError> {
    let path = diff_path(output_dir, commit_id);
    write_atomic(&path, diff_text)?;
    Ok(path)
}

/// Write `<commit_id>.md`. Skipped (returns `None`) without an assistant response.
pub fn write_transcript(
    output_dir: &Path,
    commit_id: &str,
    transcript: &Transcript,
) -> Result<Option<PathBuf>, TranscriptError> {
    let Some(markdown) = transcript.to_markdown(commit_id) else {
        debug!("Transcript for {} has no response, not writing it", commit_id);
        return Ok(None);
    };

    let path = transcript_path(output_dir, commit_id);
    write_atomic(&path, &markdown)?;
    Ok(Some(path))
}

/// Write to a temp file beside `path`, then rename it into place.
///
/// Readers see either the previous file or the complete new one.
fn write_atomic(path: &Path, contents: &str) -> Result<(), TranscriptError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| TranscriptError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_failed = |source| TranscriptError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(contents.as_bytes()).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::Prompt;

    fn transcript() -> Transcript {
        Transcript::new(Prompt {
            system: "sys".to_string(),
            user: "user".to_string(),
        })
    }

    #[test]
    fn test_write_artifacts_diff_only() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_artifacts(dir.path(), "abc", "+x\n", None).unwrap();

        assert_eq!(written.diff_path, dir.path().join("abc.diff"));
        assert!(written.transcript_path.is_none());
        assert_eq!(std::fs::read_to_string(&written.diff_path).unwrap(), "+x\n");
        assert!(!dir.path().join("abc.md").exists());
    }

    #[test]
    fn test_write_artifacts_with_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let t = transcript().with_response("because");
        let written = write_artifacts(dir.path(), "abc", "+x\n", Some(&t)).unwrap();

        let md_path = written.transcript_path.unwrap();
        assert_eq!(md_path, dir.path().join("abc.md"));
        let md = std::fs::read_to_string(md_path).unwrap();
        assert!(md.contains("## Assistant Response\n\nbecause"));
    }

    #[test]
    fn test_transcript_without_response_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_artifacts(dir.path(), "abc", "", Some(&transcript())).unwrap();
        assert!(written.transcript_path.is_none());
        assert!(!dir.path().join("abc.md").exists());
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/nested");
        let path = write_diff(&nested, "abc", "diff").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overwrite_replaces_contents_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        write_diff(dir.path(), "abc", "first").unwrap();
        let path = write_diff(dir.path(), "abc", "second").unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory occupying the target name makes the rename fail
        std::fs::create_dir(dir.path().join("abc.diff")).unwrap();

        let err = write_diff(dir.path(), "abc", "diff").unwrap_err();
        match err {
            TranscriptError::WriteFailed { path, .. } => {
                assert_eq!(path, dir.path().join("abc.diff"))
            }
            other => panic!("Expected WriteFailed, got {:?}", other),
        }
    }
}
