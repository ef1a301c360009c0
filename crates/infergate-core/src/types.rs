//! Core types: chat messages, responses, and the OpenAI-compatible wire format.
//!
//! The gateway speaks the OpenAI chat completions and embeddings APIs. Typed
//! enums here catch malformed conversations at compile time instead of on the
//! wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One embedding: a fixed-length vector of floats, produced fresh per call.
pub type EmbeddingVector = Vec<f32>;

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message. Order within a conversation is meaningful; a system
/// message, if present, comes first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum ChatMessage {
    #[serde(rename = "system")]
    System { content: String },

    /// A message from the human side of the conversation.
    #[serde(rename = "user")]
    Human { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    /// The output of a tool the assistant asked for.
    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        ChatMessage::Human {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Assistant turn that requested tools, so results can be sent back after it.
    pub fn assistant_tool_calls(calls: &[ToolInvocation]) -> Self {
        ChatMessage::Assistant {
            content: None,
            tool_calls: Some(calls.iter().map(ToolInvocation::to_wire).collect()),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Tool calls (function calling)
// ─────────────────────────────────────────────

/// A tool call as it appears on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    /// Always "function" in the current OpenAI API.
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// The function name and JSON-encoded arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// Definition of a tool, sent to the model so it knows what it may call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Chat response
// ─────────────────────────────────────────────

/// A tool the model asked to run, with its arguments decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Decoded JSON arguments. Arguments that are not valid JSON are kept
    /// verbatim as a `Value::String`.
    pub arguments: Value,
}

impl ToolInvocation {
    fn to_wire(&self) -> ToolCall {
        let arguments = match &self.arguments {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };
        ToolCall {
            id: self.id.clone(),
            call_type: function_type(),
            function: FunctionCall {
                name: self.name.clone(),
                arguments,
            },
        }
    }
}

impl From<ToolCall> for ToolInvocation {
    fn from(call: ToolCall) -> Self {
        let raw = call.function.arguments;
        let arguments = if raw.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        };
        ToolInvocation {
            id: call.id,
            name: call.function.name,
            arguments,
        }
    }
}

/// The model's reply to one chat completion call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatResponse {
    /// Assistant text. May be empty only when `tool_calls` is not.
    pub content: String,
    /// Tools the model chose to call; empty when it answered in text.
    pub tool_calls: Vec<ToolInvocation>,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage statistics reported by the gateway.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Chat completion wire types
// ─────────────────────────────────────────────

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

/// Raw chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// One `data:` event of a streamed chat completion.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

// ─────────────────────────────────────────────
// Embedding wire types
// ─────────────────────────────────────────────

/// `input` is a bare string for one text and an array for a batch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput<'a> {
    One(&'a str),
    Many(&'a [String]),
}

/// Request body for `POST /embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: EmbeddingInput<'a>,
    pub encoding_format: &'static str,
}

/// Raw embeddings response. `data` is optional so its absence can be
/// reported as a malformed response rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Option<Vec<EmbeddingDatum>>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingDatum {
    pub embedding: EmbeddingVector,
    #[serde(default)]
    pub index: Option<usize>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_human_message_uses_user_role() {
        let json = serde_json::to_value(ChatMessage::human("hi")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_assistant_message_skips_empty_fields() {
        let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, json!({"role": "assistant", "content": "ok"}));
    }

    #[test]
    fn test_tool_result_message() {
        let json = serde_json::to_value(ChatMessage::tool_result("call_1", "42")).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
    }

    #[test]
    fn test_tool_invocation_decodes_arguments() {
        let call = ToolCall {
            id: "call_1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "test_search".into(),
                arguments: r#"{"query":"predictive maintenance"}"#.into(),
            },
        };
        let inv = ToolInvocation::from(call);
        assert_eq!(inv.arguments["query"], "predictive maintenance");
    }

    #[test]
    fn test_tool_invocation_keeps_bad_arguments_verbatim() {
        let call = ToolCall {
            id: "c".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "x".into(),
                arguments: "{not json".into(),
            },
        };
        let inv = ToolInvocation::from(call);
        assert_eq!(inv.arguments, Value::String("{not json".into()));
        assert_eq!(inv.to_wire().function.arguments, "{not json");
    }

    #[test]
    fn test_tool_invocation_empty_arguments_is_empty_object() {
        let call: ToolCall =
            serde_json::from_value(json!({"function": {"name": "noop"}})).unwrap();
        let inv = ToolInvocation::from(call);
        assert_eq!(inv.arguments, json!({}));
    }

    #[test]
    fn test_assistant_tool_calls_roundtrip_to_wire() {
        let inv = ToolInvocation {
            id: "call_9".into(),
            name: "lookup".into(),
            arguments: json!({"id": 3}),
        };
        let json = serde_json::to_value(ChatMessage::assistant_tool_calls(&[inv])).unwrap();
        assert_eq!(json["tool_calls"][0]["function"]["arguments"], r#"{"id":3}"#);
        assert_eq!(json["tool_calls"][0]["type"], "function");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_embedding_request_single_and_batch() {
        let one = EmbeddingRequest {
            model: "m",
            input: EmbeddingInput::One("x"),
            encoding_format: "float",
        };
        assert_eq!(
            serde_json::to_value(&one).unwrap(),
            json!({"model": "m", "input": "x", "encoding_format": "float"})
        );

        let texts = vec!["a".to_string(), "b".to_string()];
        let many = EmbeddingRequest {
            model: "m",
            input: EmbeddingInput::Many(&texts),
            encoding_format: "float",
        };
        assert_eq!(serde_json::to_value(&many).unwrap()["input"], json!(["a", "b"]));
    }

    #[test]
    fn test_chat_request_omits_stream_when_false() {
        let msgs = [ChatMessage::human("hi")];
        let req = ChatCompletionRequest {
            model: "m",
            messages: &msgs,
            tools: None,
            max_tokens: 16,
            temperature: 0.0,
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("stream").is_none());
        assert!(json.get("tools").is_none());
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_embedding_response_without_data() {
        let resp: EmbeddingResponse = serde_json::from_value(json!({"object": "list"})).unwrap();
        assert!(resp.data.is_none());
    }
}
