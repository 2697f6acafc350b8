//! Prompt construction for commit explanations.

use crate::git::CommitInfo;
use crate::render::{RenderedFragment, concat_fragments};

/// Instruction sent as the system message for every commit.
pub const SYSTEM_PROMPT: &str = r#"You are a senior software engineer explaining a single git commit to a colleague who was not involved in writing it.

You will receive the commit's author and date, its message, and the diff of every file the commit touched. Some files may be listed only by name because they are binary, excluded from review, or could not be decoded.

Your task is to explain WHY the change was made, not merely WHAT changed. Infer the motivation from the commit message, the code, and the surrounding context. Where the intent is uncertain, say so instead of guessing.

Respond in structured prose using these sections:

### Summary
One or two sentences on the purpose of the commit.

### Motivation
The problem being solved or the goal being pursued, and why this approach was taken.

### Key Changes
The important changes, file by file or concept by concept, each with the reason it was needed.

### Impact
Behavioral changes, risks, and anything a reviewer should double-check."#;

/// A chat request ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the system and user messages for a commit.
///
/// Pure: the same commit and fragments always produce the same text.
pub fn assemble_prompt(commit: &CommitInfo, fragments: &[RenderedFragment]) -> Prompt {
    let message = commit.message.trim_end();
    let diff = concat_fragments(fragments);

    let message_fence = fence_for(message);
    let diff_fence = fence_for(&diff);

    let diff_body = if diff.is_empty() || diff.ends_with('\n') {
        diff
    } else {
        format!("{}\n", diff)
    };

    let user = format!(
        "Author: {author}\nDate: {date}\n\nCommit message:\n{message_fence}text\n{message}\n{message_fence}\n\nChanges ({count} files):\n{diff_fence}diff\n{diff_body}{diff_fence}\n",
        author = commit.author,
        date = commit.date(),
        count = fragments.len(),
    );

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Pick a backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}
