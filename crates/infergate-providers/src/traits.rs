//! Backend traits: the seams the diagnostic runner (and any other caller)
//! programs against. `ChatClient` and `EmbeddingClient` are the HTTP
//! implementations.

use async_trait::async_trait;

use infergate_core::{ChatError, ChatMessage, ChatResponse, EmbeddingError, EmbeddingVector};

use crate::tools::ToolSet;

/// A chat completion backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a conversation and get the model's reply.
    ///
    /// Returns non-empty content or a typed error; never an empty success.
    async fn invoke(&self, conversation: &[ChatMessage]) -> Result<ChatResponse, ChatError>;

    /// Like [`invoke`](Self::invoke), with `tools` bound for this call only.
    ///
    /// Content may be empty when the model called a tool. An empty
    /// `tool_calls` means it answered in text, which is not an error.
    async fn invoke_with_tools(
        &self,
        conversation: &[ChatMessage],
        tools: &ToolSet,
    ) -> Result<ChatResponse, ChatError>;

    /// Model identifier, for logging and reports.
    fn model(&self) -> &str;
}

/// A text embedding backend.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// One vector per input text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError>;

    fn model(&self) -> &str;
}
