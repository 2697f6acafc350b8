//! One commit, end to end: resolve, classify, render, explain, persist.

use std::path::PathBuf;

use git2::Repository;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::explain::{Explainer, Prompt, assemble_prompt};
use crate::git::{AddDeleteMode, CommitInfo, classify_changes, resolve_commit};
use crate::render::{RenderOptions, RenderedFragment, concat_fragments, render_all};
use crate::transcript::{Transcript, WrittenArtifacts, write_artifacts, write_transcript};

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// `None` uses HEAD.
    pub commit_ref: Option<String>,
    pub output_dir: PathBuf,
    pub render: RenderOptions,
    pub add_delete_mode: AddDeleteMode,
}

/// Everything derived from the repository before any I/O happens.
#[derive(Debug, Clone)]
pub struct PreparedCommit {
    pub commit: CommitInfo,
    pub fragments: Vec<RenderedFragment>,
    pub diff_text: String,
    pub prompt: Prompt,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub commit: CommitInfo,
    pub transcript: Option<Transcript>,
    pub artifacts: WrittenArtifacts,
}

/// Drives a single commit through every stage.
pub struct Pipeline {
    options: PipelineOptions,
    explainer: Option<Box<dyn Explainer>>,
}

impl Pipeline {
    /// A pipeline that writes only the diff artifact.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            explainer: None,
        }
    }

    /// Explain commits with `explainer` and write transcripts.
    pub fn with_explainer(mut self, explainer: Box<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Resolve the commit and build its fragments and prompt.
    pub fn prepare(&self, repo: &Repository) -> Result<PreparedCommit, PipelineError> {
        let resolved = resolve_commit(repo, self.options.commit_ref.as_deref())?;
        let records = classify_changes(
            repo,
            resolved.parent.as_ref(),
            &resolved.commit,
            self.options.add_delete_mode,
        )?;

        let fragments = render_all(records, &self.options.render);
        let elided = fragments.iter().filter(|f| f.is_elided()).count();
        debug!(
            "Rendered {} fragments for {} ({} elided)",
            fragments.len(),
            resolved.commit.short_hash(),
            elided
        );

        let diff_text = concat_fragments(&fragments);
        let prompt = assemble_prompt(&resolved.commit, &fragments);

        Ok(PreparedCommit {
            commit: resolved.commit,
            fragments,
            diff_text,
            prompt,
        })
    }

    /// Persist the diff, then explain and persist the transcript.
    ///
    /// The diff artifact is written before the explainer runs, so it survives
    /// an explainer failure.
    pub async fn run(&self, prepared: PreparedCommit) -> Result<RunOutcome, PipelineError> {
        let PreparedCommit {
            commit,
            diff_text,
            prompt,
            ..
        } = prepared;

        let mut artifacts = write_artifacts(&self.options.output_dir, &commit.hash, &diff_text, None)?;
        info!("Wrote diff to {}", artifacts.diff_path.display());

        let Some(explainer) = self.explainer.as_deref() else {
            return Ok(RunOutcome {
                commit,
                transcript: None,
                artifacts,
            });
        };

        let assistant = explainer
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(|source| PipelineError::Explain {
                diff_path: artifacts.diff_path.clone(),
                source,
            })?;

        let transcript = Transcript::new(prompt).with_response(assistant);
        artifacts.transcript_path =
            write_transcript(&self.options.output_dir, &commit.hash, &transcript)?;

        Ok(RunOutcome {
            commit,
            transcript: Some(transcript),
            artifacts,
        })
    }
}
