//! HTTP transport adapter: JSON POSTs to an OpenAI-compatible gateway.
//!
//! One place owns the header and status policy so the chat and embedding
//! clients cannot drift apart: `Content-Type: application/json` always,
//! `Authorization: Bearer …` only when a real key is configured, and every
//! non-2xx answer becomes a [`TransportError`]. No retries.

use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use infergate_core::{ConfigError, EndpointConfig, TransportError};

/// Connection-pooled HTTP client bound to one [`EndpointConfig`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: EndpointConfig,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.config.base_url())
            .field("authenticated", &self.config.api_key().is_some())
            .finish()
    }
}

impl HttpTransport {
    /// Validate `config` and build the underlying client with its fixed timeout.
    pub fn new(config: EndpointConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::new("transport", format!("cannot build HTTP client: {e}")))?;

        Ok(HttpTransport { client, config })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        self.config.endpoint_url(path)
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        match self.config.api_key() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// POST `body` as JSON to `path` and return the decoded JSON answer.
    ///
    /// A 2xx body that is not JSON comes back as `Value::String` holding the
    /// raw text, so the caller's shape check reports it as a malformed response.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(path, body).await?;
        let url = response.url().to_string();

        let text = response.text().await.map_err(|e| {
            error!(url = %url, error = %e, "failed to read response body");
            TransportError::network(&url, format!("failed to read response body: {e}"), e.is_timeout())
        })?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(url = %url, error = %e, "response body is not JSON");
                Ok(Value::String(text))
            }
        }
    }

    /// POST `body` and hand back the raw response for incremental reading
    /// (server-sent events). Same header and status policy as [`post`](Self::post).
    pub async fn post_stream<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, TransportError>
    where
        B: Serialize + ?Sized,
    {
        self.send(path, body).await
    }

    async fn send<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let payload = serde_json::to_vec(body)
            .map_err(|e| TransportError::network(&url, format!("cannot encode request body: {e}"), false))?;

        debug!(url = %url, bytes = payload.len(), "POST");

        let response = self
            .request(&url)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "HTTP request failed");
                TransportError::network(&url, e.to_string(), e.is_timeout())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(url = %url, status = %status, body = %error_text, "gateway error");
            return Err(TransportError::status(&url, status.as_u16(), error_text));
        }

        Ok(response)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
