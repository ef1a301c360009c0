//! Configuration schema: the on-disk / environment shape of the settings.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use super::endpoint::{
    EndpointConfig, DEFAULT_COMPLETION_MODEL, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TIMEOUT_MS,
};

/// Embedding dimensionality the downstream vector index was built with.
pub const DEFAULT_EXPECTED_DIMENSIONS: usize = 1024;

/// Root configuration: loaded from `~/.infergate/config.json` + env vars.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Gateway connection settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// OpenAI-compatible base URL, e.g. `"https://mlis.example.com/v1"`.
    pub base_url: String,
    /// Bearer token. Many self-hosted NIM deployments need none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub completion_model: String,
    pub embedding_model: String,
    pub request_timeout_ms: u64,
    pub max_output_tokens: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GatewayConfig {
    /// Names of required settings that are empty, in display order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("baseUrl");
        }
        if self.completion_model.trim().is_empty() {
            missing.push("completionModel");
        }
        if self.embedding_model.trim().is_empty() {
            missing.push("embeddingModel");
        }
        missing
    }

    /// Build the immutable client config.
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::new(self.base_url.trim())
            .with_api_key(self.api_key.clone())
            .with_completion_model(self.completion_model.clone())
            .with_embedding_model(self.embedding_model.clone())
            .with_request_timeout_ms(self.request_timeout_ms)
            .with_max_output_tokens(self.max_output_tokens)
    }
}

/// Settings for the connectivity check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Dimensionality the embedding stage expects; a mismatch is a warning.
    pub expected_dimensions: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            expected_dimensions: DEFAULT_EXPECTED_DIMENSIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.gateway.base_url.is_empty());
        assert_eq!(config.gateway.completion_model, "meta/llama-3.1-70b-instruct");
        assert_eq!(config.diagnostics.expected_dimensions, 1024);
    }

    #[test]
    fn test_camel_case_roundtrip_keys() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["gateway"].get("baseUrl").is_some());
        assert!(json["gateway"].get("requestTimeoutMs").is_some());
        assert!(json["gateway"].get("apiKey").is_none());
        assert!(json["diagnostics"].get("expectedDimensions").is_some());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "gateway": { "baseUrl": "http://gw/v1", "apiKey": "k" } }"#,
        )
        .unwrap();
        assert_eq!(config.gateway.base_url, "http://gw/v1");
        assert_eq!(config.gateway.api_key.as_deref(), Some("k"));
        assert_eq!(config.gateway.embedding_model, "nvidia/nv-embedqa-e5-v5");
        assert_eq!(config.gateway.request_timeout_ms, 120_000);
    }

    #[test]
    fn test_missing_required() {
        let mut gw = GatewayConfig::default();
        assert_eq!(gw.missing_required(), vec!["baseUrl"]);

        gw.base_url = "http://gw".into();
        gw.embedding_model = " ".into();
        assert_eq!(gw.missing_required(), vec!["embeddingModel"]);
    }

    #[test]
    fn test_endpoint_config_from_gateway() {
        let gw = GatewayConfig {
            base_url: " http://gw/v1 ".into(),
            api_key: Some(String::new()),
            request_timeout_ms: 5000,
            ..Default::default()
        };
        let cfg = gw.endpoint_config();
        assert_eq!(cfg.base_url(), "http://gw/v1");
        assert!(cfg.api_key().is_none());
        assert_eq!(cfg.request_timeout().as_millis(), 5000);
    }
}
