//! Chat client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! `ChatClient` is owned by the caller and passed by reference (or cloned;
//! clones share one backend). The HTTP backend is built on first use and
//! memoized: configuration errors therefore surface the first time chat is
//! actually needed, before any request is sent. Construction is serialized, so
//! concurrent first calls build exactly one backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use infergate_core::types::{ChatCompletionRequest, ChatCompletionResponse, ToolDefinition};
use infergate_core::{ChatError, ChatMessage, ChatResponse, EndpointConfig, ToolInvocation};

use crate::stream::{text_deltas, ChatStream};
use crate::tools::ToolSet;
use crate::traits::ChatBackend;
use crate::transport::HttpTransport;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Sampling temperature. Fixed for deterministic diagnostics and agent turns.
const TEMPERATURE: f64 = 0.0;

struct Shared {
    config: EndpointConfig,
    backend: OnceCell<HttpTransport>,
}

/// Lazily-initialized chat completion client.
#[derive(Clone)]
pub struct ChatClient {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.shared.config.base_url())
            .field("model", &self.shared.config.completion_model())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl ChatClient {
    /// Wrap `config`. Nothing is validated or connected until first use.
    pub fn new(config: EndpointConfig) -> Self {
        ChatClient {
            shared: Arc::new(Shared {
                config,
                backend: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.shared.config
    }

    /// Whether the backend has been built.
    pub fn is_initialized(&self) -> bool {
        self.shared.backend.initialized()
    }

    fn endpoint(&self) -> String {
        self.shared.config.endpoint_url(CHAT_COMPLETIONS_PATH)
    }

    async fn backend(&self) -> Result<&HttpTransport, ChatError> {
        self.shared
            .backend
            .get_or_try_init(|| async {
                let transport = HttpTransport::new(self.shared.config.clone()).map_err(|e| {
                    error!(error = %e, "chat client configuration rejected");
                    e
                })?;
                info!(
                    base_url = self.shared.config.base_url(),
                    model = self.shared.config.completion_model(),
                    "chat client initialized"
                );
                Ok::<_, ChatError>(transport)
            })
            .await
    }

    fn request<'a>(
        &'a self,
        conversation: &'a [ChatMessage],
        tools: Option<Vec<ToolDefinition>>,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        let config = &self.shared.config;
        ChatCompletionRequest {
            model: config.completion_model(),
            messages: conversation,
            tools,
            max_tokens: config.max_output_tokens(),
            temperature: TEMPERATURE,
            stream,
        }
    }

    async fn complete(
        &self,
        conversation: &[ChatMessage],
        tools: Option<&ToolSet>,
    ) -> Result<ChatResponse, ChatError> {
        let backend = self.backend().await?;

        let definitions = tools.filter(|t| !t.is_empty()).map(ToolSet::definitions);
        debug!(
            model = self.shared.config.completion_model(),
            messages = conversation.len(),
            tools = definitions.as_ref().map_or(0, Vec::len),
            "calling chat completion"
        );

        let definitions_sent = definitions.is_some();
        let body = self.request(conversation, definitions, false);
        let value = backend.post(CHAT_COMPLETIONS_PATH, &body).await?;

        let response = self.parse(value, definitions_sent)?;
        debug!(
            content_len = response.content.len(),
            tool_calls = response.tool_calls.len(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("?"),
            "chat response received"
        );
        Ok(response)
    }

    /// Decode a completion. Empty content is only acceptable when tools were
    /// offered and the model called one.
    fn parse(&self, value: serde_json::Value, tools_offered: bool) -> Result<ChatResponse, ChatError> {
        let raw: ChatCompletionResponse =
            serde_json::from_value(value).map_err(|e| ChatError::MalformedResponse {
                endpoint: self.endpoint(),
                reason: e.to_string(),
            })?;

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse {
                endpoint: self.endpoint(),
                reason: "no choices in response".to_string(),
            })?;

        let response = ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(ToolInvocation::from)
                .collect(),
            finish_reason: choice.finish_reason,
            usage: raw.usage,
        };

        let tool_only = tools_offered && response.has_tool_calls();
        if response.content.trim().is_empty() && !tool_only {
            return Err(ChatError::EmptyResponse {
                endpoint: self.endpoint(),
            });
        }
        Ok(response)
    }

    /// Stream the reply as text deltas (`stream: true`, server-sent events).
    pub async fn stream(&self, conversation: &[ChatMessage]) -> Result<ChatStream, ChatError> {
        let backend = self.backend().await?;
        let body = self.request(conversation, None, true);

        debug!(
            model = self.shared.config.completion_model(),
            messages = conversation.len(),
            "streaming chat completion"
        );

        let response = backend.post_stream(CHAT_COMPLETIONS_PATH, &body).await?;
        Ok(text_deltas(Box::pin(response.bytes_stream()), self.endpoint()))
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn invoke(&self, conversation: &[ChatMessage]) -> Result<ChatResponse, ChatError> {
        self.complete(conversation, None).await
    }

    async fn invoke_with_tools(
        &self,
        conversation: &[ChatMessage],
        tools: &ToolSet,
    ) -> Result<ChatResponse, ChatError> {
        self.complete(conversation, Some(tools)).await
    }

    fn model(&self) -> &str {
        self.shared.config.completion_model()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
