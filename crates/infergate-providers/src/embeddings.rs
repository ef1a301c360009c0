//! Embedding client for OpenAI-compatible `/embeddings` endpoints.
//!
//! Single-text and batch requests. Batch backends may answer out of order,
//! tagging each item with an `index`; results are always put back into input
//! order before they are returned.

use async_trait::async_trait;
use tracing::{debug, warn};

use infergate_core::types::{EmbeddingDatum, EmbeddingInput, EmbeddingRequest, EmbeddingResponse};
use infergate_core::{ConfigError, EmbeddingError, EmbeddingVector, EndpointConfig};

use crate::traits::EmbeddingBackend;
use crate::transport::HttpTransport;

pub const EMBEDDINGS_PATH: &str = "/embeddings";

/// Stateless embedding client. Cheap to clone; safe to use concurrently.
#[derive(Clone, Debug)]
pub struct EmbeddingClient {
    transport: HttpTransport,
}

impl EmbeddingClient {
    /// Validate `config` and build the client.
    pub fn new(config: EndpointConfig) -> Result<Self, ConfigError> {
        Ok(EmbeddingClient {
            transport: HttpTransport::new(config)?,
        })
    }

    fn endpoint(&self) -> String {
        self.transport.url(EMBEDDINGS_PATH)
    }

    fn malformed(&self, reason: impl Into<String>) -> EmbeddingError {
        EmbeddingError::MalformedResponse {
            endpoint: self.endpoint(),
            reason: reason.into(),
        }
    }

    async fn request(&self, input: EmbeddingInput<'_>) -> Result<Vec<EmbeddingDatum>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: self.transport.config().embedding_model(),
            input,
            encoding_format: "float",
        };

        let value = self.transport.post(EMBEDDINGS_PATH, &body).await?;

        let parsed: EmbeddingResponse = serde_json::from_value(value).map_err(|e| {
            warn!(endpoint = %self.endpoint(), error = %e, "unexpected embeddings payload");
            self.malformed(e.to_string())
        })?;

        parsed
            .data
            .ok_or_else(|| self.malformed("response has no `data` list"))
    }
}

#[async_trait]
impl EmbeddingBackend for EmbeddingClient {
    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let data = self.request(EmbeddingInput::One(text)).await?;
        let first = data
            .into_iter()
            .next()
            .ok_or_else(|| self.malformed("`data` list is empty"))?;

        debug!(
            model = self.transport.config().embedding_model(),
            dimensions = first.embedding.len(),
            "embedding received"
        );
        Ok(first.embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let data = self.request(EmbeddingInput::Many(texts)).await?;
        let vectors = order_by_index(data, texts.len()).map_err(|reason| self.malformed(reason))?;

        debug!(
            model = self.transport.config().embedding_model(),
            count = vectors.len(),
            "batch embeddings received"
        );
        Ok(vectors)
    }

    fn model(&self) -> &str {
        self.transport.config().embedding_model()
    }
}

/// Sort batch results by their `index` and check they cover `0..expected`
/// exactly once. Items without an index keep their position.
fn order_by_index(data: Vec<EmbeddingDatum>, expected: usize) -> Result<Vec<EmbeddingVector>, String> {
    if data.len() != expected {
        return Err(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        ));
    }

    let mut indexed: Vec<(usize, EmbeddingVector)> = data
        .into_iter()
        .enumerate()
        .map(|(pos, item)| (item.index.unwrap_or(pos), item.embedding))
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    indexed
        .into_iter()
        .enumerate()
        .map(|(slot, (index, embedding))| {
            if index == slot {
                Ok(embedding)
            } else {
                Err(format!("index {index} is duplicated or out of range for {expected} inputs"))
            }
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
