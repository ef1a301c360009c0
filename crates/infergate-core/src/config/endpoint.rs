//! `EndpointConfig`: the immutable connection settings every client is built from.

use std::time::Duration;

use crate::error::ConfigError;

/// Default completion model served by NVIDIA NIM gateways.
pub const DEFAULT_COMPLETION_MODEL: &str = "meta/llama-3.1-70b-instruct";
/// Default embedding model (1024 dimensions).
pub const DEFAULT_EMBEDDING_MODEL: &str = "nvidia/nv-embedqa-e5-v5";
/// Default per-request timeout: two minutes, sized for long agent turns.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;
/// Default cap on generated tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Connection settings for one OpenAI-compatible gateway.
///
/// Fields are private: once built, a config never changes. Construction does
/// not validate; [`EndpointConfig::validate`] is called by the clients at first
/// use so misconfiguration surfaces exactly when a client is needed.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: String,
    api_key: Option<String>,
    completion_model: String,
    embedding_model: String,
    request_timeout_ms: u64,
    max_output_tokens: u32,
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("completion_model", &self.completion_model)
            .field("embedding_model", &self.embedding_model)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl EndpointConfig {
    /// Create a config for `base_url` with default models and limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Set the bearer token. Blank keys are stored as "no key".
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_output_tokens(mut self, max_tokens: u32) -> Self {
        self.max_output_tokens = max_tokens;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn completion_model(&self) -> &str {
        &self.completion_model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    /// Build the full URL for an endpoint path such as `"/embeddings"`.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Check every required field.
    ///
    /// `baseUrl` must be non-empty and start with `http://` or `https://`
    /// followed by a host; models must be non-empty; the timeout must be > 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::new("baseUrl", "is required but not set"));
        }
        let host = base
            .strip_prefix("https://")
            .or_else(|| base.strip_prefix("http://"))
            .ok_or_else(|| {
                ConfigError::new("baseUrl", format!("'{base}' is not an http(s) URL"))
            })?;
        if host.is_empty() || host.starts_with('/') {
            return Err(ConfigError::new("baseUrl", format!("'{base}' has no host")));
        }
        if self.completion_model.trim().is_empty() {
            return Err(ConfigError::new("completionModel", "must not be empty"));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::new("embeddingModel", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::new("requestTimeoutMs", "must be greater than zero"));
        }
        Ok(())
    }
}
