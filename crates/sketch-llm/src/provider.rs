use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// A chat completion backend.
#[async_trait]
pub trait DiagramProvider: Send + Sync {
    /// Send `messages` authorized by `api_key` and return the trimmed text of the first
    /// completion.
    ///
    /// One attempt only: failures are reported, never retried.
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String>;
}
