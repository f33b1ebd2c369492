use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Upstream answered with a non-success status
    #[error("completion endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion response malformed: {0}")]
    MalformedResponse(String),
}

/// Port for the language-model chat completion
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Returns the trimmed text of the first completion choice
    async fn complete(&self, message: &str) -> Result<String, CompletionError>;
}
