//! LLM chat completion clients.
//!
//! The generation pipeline treats the model as an untrusted, possibly slow
//! collaborator: every call returns a result and the caller owns the timeout.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::{LlmConfig, OpenAiClient};

/// Errors emitted by LLM clients.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("completion contained no content")]
    EmptyCompletion,
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A chat completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system instruction plus a user prompt, returning the raw
    /// completion text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}
