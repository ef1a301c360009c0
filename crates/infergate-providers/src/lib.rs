//! Gateway clients for Infergate.
//!
//! Talks directly to any OpenAI-compatible gateway (NVIDIA NIM, vLLM, MLIS…).
//!
//! # Architecture
//!
//! - [`transport::HttpTransport`]: JSON POST with the auth/status policy
//! - [`embeddings::EmbeddingClient`]: `/embeddings`, single and batch
//! - [`chat::ChatClient`]: `/chat/completions`, lazily initialized
//! - [`tools::ToolSet`]: tools bound to one chat call
//! - [`traits`]: `ChatBackend` / `EmbeddingBackend` seams

pub mod chat;
pub mod embeddings;
pub mod stream;
pub mod tools;
pub mod traits;
pub mod transport;

// Re-export main types for convenience
pub use chat::ChatClient;
pub use embeddings::EmbeddingClient;
pub use stream::ChatStream;
pub use tools::{ToolSet, ToolSpec};
pub use traits::{ChatBackend, EmbeddingBackend};
pub use transport::HttpTransport;
