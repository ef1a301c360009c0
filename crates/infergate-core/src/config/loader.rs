//! Config loader: reads `~/.infergate/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.infergate/config.json`
//! 3. Environment variables `INFERGATE_*` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Infergate data directory (e.g. `~/.infergate/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".infergate")
}

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(read_config_file(&config_path))
}

/// Read the JSON file only, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `INFERGATE_BASE_URL` → `gateway.base_url`
/// - `INFERGATE_API_KEY` → `gateway.api_key`
/// - `INFERGATE_COMPLETION_MODEL` → `gateway.completion_model`
/// - `INFERGATE_EMBEDDING_MODEL` → `gateway.embedding_model`
/// - `INFERGATE_TIMEOUT_MS` → `gateway.request_timeout_ms`
/// - `INFERGATE_MAX_TOKENS` → `gateway.max_output_tokens`
/// - `INFERGATE_EXPECTED_DIMENSIONS` → `diagnostics.expected_dimensions`
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let gw = &mut config.gateway;

    if let Some(val) = lookup("INFERGATE_BASE_URL") {
        gw.base_url = val;
    }
    if let Some(val) = lookup("INFERGATE_API_KEY") {
        gw.api_key = Some(val);
    }
    if let Some(val) = lookup("INFERGATE_COMPLETION_MODEL") {
        gw.completion_model = val;
    }
    if let Some(val) = lookup("INFERGATE_EMBEDDING_MODEL") {
        gw.embedding_model = val;
    }
    if let Some(val) = lookup("INFERGATE_TIMEOUT_MS") {
        match val.parse::<u64>() {
            Ok(n) => gw.request_timeout_ms = n,
            Err(_) => warn!(value = %val, "ignoring non-numeric INFERGATE_TIMEOUT_MS"),
        }
    }
    if let Some(val) = lookup("INFERGATE_MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => gw.max_output_tokens = n,
            Err(_) => warn!(value = %val, "ignoring non-numeric INFERGATE_MAX_TOKENS"),
        }
    }
    if let Some(val) = lookup("INFERGATE_EXPECTED_DIMENSIONS") {
        match val.parse::<usize>() {
            Ok(n) => config.diagnostics.expected_dimensions = n,
            Err(_) => warn!(value = %val, "ignoring non-numeric INFERGATE_EXPECTED_DIMENSIONS"),
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = read_config_file(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "gateway": {
                "baseUrl": "https://mlis.example.com/v1",
                "embeddingModel": "nvidia/nv-embed-v1"
            },
            "diagnostics": { "expectedDimensions": 4096 }
        }"#,
        );

        let config = read_config_file(file.path());
        assert_eq!(config.gateway.base_url, "https://mlis.example.com/v1");
        assert_eq!(config.gateway.embedding_model, "nvidia/nv-embed-v1");
        assert_eq!(config.diagnostics.expected_dimensions, 4096);
        // Default preserved
        assert_eq!(config.gateway.max_output_tokens, 4096);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = read_config_file(file.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.gateway.base_url = "http://localhost:8000/v1".to_string();
        config.gateway.api_key = Some("nvapi-test".to_string());

        save_config(&config, Some(&path)).unwrap();

        let reloaded = read_config_file(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_env_overrides_strings() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("INFERGATE_BASE_URL", "http://env-gw/v1"),
                ("INFERGATE_API_KEY", "env-key"),
                ("INFERGATE_COMPLETION_MODEL", "meta/llama-3.1-8b-instruct"),
            ]),
        );
        assert_eq!(config.gateway.base_url, "http://env-gw/v1");
        assert_eq!(config.gateway.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.gateway.completion_model, "meta/llama-3.1-8b-instruct");
    }

    #[test]
    fn test_env_overrides_numbers() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("INFERGATE_TIMEOUT_MS", "3000"),
                ("INFERGATE_EXPECTED_DIMENSIONS", "768"),
            ]),
        );
        assert_eq!(config.gateway.request_timeout_ms, 3000);
        assert_eq!(config.diagnostics.expected_dimensions, 768);
    }

    #[test]
    fn test_env_override_bad_number_ignored() {
        let config = apply_overrides(Config::default(), env(&[("INFERGATE_MAX_TOKENS", "lots")]));
        assert_eq!(config.gateway.max_output_tokens, 4096);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = write_temp_json(r#"{ "gateway": { "baseUrl": "http://file/v1" } }"#);
        let config = apply_overrides(
            read_config_file(file.path()),
            env(&[("INFERGATE_BASE_URL", "http://env/v1")]),
        );
        assert_eq!(config.gateway.base_url, "http://env/v1");
    }
}
