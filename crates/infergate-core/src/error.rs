//! Error taxonomy shared by every Infergate crate.
//!
//! Each component boundary has its own error type so a caller can tell "the
//! chat endpoint is down" from "the embedding endpoint is down" by matching on
//! the type alone. Low-level [`TransportError`]s never cross a boundary bare;
//! they are wrapped into [`ChatError`] or [`EmbeddingError`] first.

use thiserror::Error;

// ─────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────

/// Missing or invalid required configuration. Always fatal.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid configuration for {field}: {reason}")]
pub struct ConfigError {
    /// Name of the offending configuration field (e.g. `"baseUrl"`).
    pub field: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────

/// A network or HTTP-status failure talking to the gateway.
///
/// `status` is `None` when no response was received at all (DNS failure,
/// connection refused, timeout). Never retried internally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}", describe_transport(.url, .status, .body, .timed_out))]
pub struct TransportError {
    /// Full request URL.
    pub url: String,
    /// HTTP status code, if the server answered.
    pub status: Option<u16>,
    /// Response body on HTTP errors, or the network failure cause otherwise.
    pub body: String,
    /// Whether the request hit the configured timeout.
    pub timed_out: bool,
}

impl TransportError {
    /// Non-success HTTP status.
    pub fn status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            body: body.into(),
            timed_out: false,
        }
    }

    /// No usable response: DNS, refused connection, broken body, timeout.
    pub fn network(url: impl Into<String>, cause: impl Into<String>, timed_out: bool) -> Self {
        Self {
            url: url.into(),
            status: None,
            body: cause.into(),
            timed_out,
        }
    }
}

fn describe_transport(url: &str, status: &Option<u16>, body: &str, timed_out: &bool) -> String {
    match status {
        Some(code) => format!("POST {url} returned {code}: {body}"),
        None if *timed_out => format!("POST {url} timed out: {body}"),
        None => format!("POST {url} failed: {body}"),
    }
}

// ─────────────────────────────────────────────
// Embeddings
// ─────────────────────────────────────────────

/// Failure of the embedding subsystem.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EmbeddingError {
    #[error("embedding client misconfigured: {0}")]
    Configuration(#[from] ConfigError),

    #[error("embedding request failed: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered, but not in the OpenAI embeddings shape.
    #[error("unexpected response from embeddings endpoint {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Failure of the chat completion subsystem.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ChatError {
    #[error("chat client misconfigured: {0}")]
    Configuration(#[from] ConfigError),

    #[error("chat completion failed: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected response from chat endpoint {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// The model answered with neither text nor tool calls.
    #[error("chat completion returned an empty response from {endpoint}")]
    EmptyResponse { endpoint: String },
}

// ─────────────────────────────────────────────
// Similarity
// ─────────────────────────────────────────────

/// Programmer or data errors in the similarity evaluator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("vector dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// One of the vectors has zero magnitude, so the angle is undefined.
    #[error("{which} vector has zero magnitude")]
    DegenerateVector { which: &'static str },
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Errors from building or dispatching a tool set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("tool '{0}' is already registered in this tool set")]
    DuplicateName(String),

    #[error("tool '{0}' not found")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_status_message_includes_code_and_body() {
        let err = TransportError::status("http://gw/v1/embeddings", 503, "overloaded");
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
        assert!(msg.contains("/embeddings"));
    }

    #[test]
    fn transport_timeout_message() {
        let err = TransportError::network("http://gw/v1/chat/completions", "deadline", true);
        assert_eq!(err.status, None);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn subsystem_wrapping_is_distinguishable() {
        let transport = TransportError::network("http://gw", "connection refused", false);
        let chat: ChatError = transport.clone().into();
        let embed: EmbeddingError = transport.into();
        assert!(chat.to_string().starts_with("chat completion failed"));
        assert!(embed.to_string().starts_with("embedding request failed"));
    }

    #[test]
    fn config_error_names_field() {
        let err = ConfigError::new("baseUrl", "must not be empty");
        assert_eq!(err.to_string(), "invalid configuration for baseUrl: must not be empty");
    }
}
