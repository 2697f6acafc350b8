//! Transcript data and its markdown form.

use crate::explain::Prompt;

/// System, user, and assistant messages for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    system: String,
    user: String,
    assistant: Option<String>,
}

impl Transcript {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            assistant: None,
        }
    }

    /// Attach the model's reply.
    pub fn with_response(self, assistant: impl Into<String>) -> Self {
        Self {
            assistant: Some(assistant.into()),
            ..self
        }
    }

    pub fn assistant(&self) -> Option<&str> {
        self.assistant.as_deref()
    }

    /// Render as markdown, or `None` if there is no assistant response yet.
    pub fn to_markdown(&self, commit_id: &str) -> Option<String> {
        let assistant = self.assistant.as_deref()?;

        let mut out = format!("# Commit {}\n\n", commit_id);
        for (heading, body) in [
            ("System Message", self.system.as_str()),
            ("User Message", self.user.as_str()),
            ("Assistant Response", assistant),
        ] {
            out.push_str("## ");
            out.push_str(heading);
            out.push_str("\n\n");
            out.push_str(body.trim_end());
            out.push_str("\n\n");
        }

        Some(out)
    }
}
