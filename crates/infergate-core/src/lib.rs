//! Core building blocks for Infergate.
//!
//! - [`config`]: `EndpointConfig` plus the file/env loader that produces it
//! - [`types`]: chat messages, responses, and OpenAI wire formats
//! - [`error`]: per-subsystem error types
//! - [`similarity`]: cosine similarity over embedding vectors

pub mod config;
pub mod error;
pub mod similarity;
pub mod types;

pub use config::EndpointConfig;
pub use error::{ChatError, ConfigError, EmbeddingError, SimilarityError, ToolError, TransportError};
pub use similarity::cosine_similarity;
pub use types::{ChatMessage, ChatResponse, EmbeddingVector, ToolInvocation};
