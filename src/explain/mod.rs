//! Prompt construction and the chat-completion explainer.

pub mod client;
pub mod config;
pub mod prompt;

pub use client::{ChatCompletionClient, Explainer};
pub use config::ExplainerConfig;
pub use prompt::{Prompt, SYSTEM_PROMPT, assemble_prompt};
