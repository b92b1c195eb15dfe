//! Chat-completion providers.
//!
//! [`CompletionClient`] is the seam between the request pipeline and the
//! external language model. [`OpenAiClient`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint; tests substitute in-memory fakes.

mod openai;

pub use openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient, OpenAiConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single completion exchange. Nothing is retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request never produced an HTTP response.
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status; `body` is its text verbatim.
    #[error("completion provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a chat-completion object.
    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider returned no choices.
    #[error("completion provider returned no choices")]
    EmptyChoices,
}

/// A single-turn chat completion: one system message, one user message.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the two messages and return the first choice's text.
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError>;
}

// Compile-time assertion: CompletionClient must be usable as `dyn CompletionClient`.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionClient) {}
};
