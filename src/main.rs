//! explain-commits - CLI entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use explain_commits::git::open_repository;
use explain_commits::{
    AddDeleteMode, ChatCompletionClient, EncodingStrategy, ExplainerConfig, ExtensionFilter,
    Pipeline, PipelineError, PipelineOptions, RenderOptions,
};

/// Explain why a git commit was made, using a language model.
#[derive(Parser, Debug)]
#[command(name = "explain-commits")]
#[command(about = "Explain why a git commit was made, using a language model")]
#[command(version)]
struct Cli {
    /// Path to the git repository
    repo: PathBuf,

    /// Commit to explain (hash, branch, tag, or revspec). Defaults to HEAD
    #[arg(short, long)]
    commit: Option<String>,

    /// Only render full diffs for these extensions (comma separated, e.g. ".c,.h")
    #[arg(short = 'e', long, value_name = "EXTS")]
    extensions: Option<ExtensionFilter>,

    /// Directory for the .diff and .md files (defaults to the repository path)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// How to decode diffs that are not valid UTF-8
    #[arg(long, value_enum, default_value_t = EncodingStrategy::Detect)]
    encoding: EncodingStrategy,

    /// Render added/deleted files as hunks or as their full content
    #[arg(long, value_enum, default_value_t = AddDeleteMode::Hunk)]
    add_delete_mode: AddDeleteMode,

    /// Model name (overrides EXPLAIN_COMMITS_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Request timeout in seconds (overrides EXPLAIN_COMMITS_TIMEOUT)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Write the diff without asking the model
    #[arg(long)]
    diff_only: bool,

    /// Print the prompt without writing files or calling the model
    #[arg(long, conflicts_with = "diff_only")]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Open git repository
    let repo = open_repository(&cli.repo).context("Not a git repository")?;

    let output_dir = cli.output_dir.clone().unwrap_or_else(|| cli.repo.clone());
    let options = PipelineOptions {
        commit_ref: cli.commit.clone(),
        output_dir,
        render: RenderOptions {
            filter: cli.extensions.clone(),
            encoding: cli.encoding,
        },
        add_delete_mode: cli.add_delete_mode,
    };

    // Step 2: Build the explainer (skipped when no model call is needed)
    let mut pipeline = Pipeline::new(options);
    if !cli.diff_only && !cli.dry_run {
        let client = ChatCompletionClient::new(explainer_config(&cli))
            .context("Failed to set up the model client")?;
        pipeline = pipeline.with_explainer(Box::new(client));
    }

    // Step 3: Resolve, classify, render, assemble
    let prepared = pipeline
        .prepare(&repo)
        .context("Failed to prepare commit")?;

    println!(
        "Commit {}: {} ({} files changed)",
        prepared.commit.short_hash(),
        prepared.commit.summary(),
        prepared.fragments.len()
    );

    if cli.dry_run {
        println!("\n--- System Message ---\n\n{}", prepared.prompt.system);
        println!("\n--- User Message ---\n\n{}", prepared.prompt.user);
        return Ok(());
    }

    if !cli.diff_only {
        println!("Asking the model to explain the commit...");
    }

    // Step 4: Write the diff, explain, write the transcript
    match pipeline.run(prepared).await {
        Ok(outcome) => {
            println!("✓ Diff written to {}", outcome.artifacts.diff_path.display());
            if let Some(path) = outcome.artifacts.transcript_path {
                println!("✓ Transcript written to {}", path.display());
            }
            Ok(())
        }
        Err(PipelineError::Explain { diff_path, source }) => {
            println!("✓ Diff written to {}", diff_path.display());
            if source.is_retryable() {
                eprintln!("The model request failed but may succeed if you rerun the command.");
            }
            bail!("Failed to explain commit: {}", source)
        }
        Err(e) => Err(e).context("Failed to write output"),
    }
}

fn explainer_config(cli: &Cli) -> ExplainerConfig {
    let mut config = ExplainerConfig::from_env();
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "explain_commits=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
