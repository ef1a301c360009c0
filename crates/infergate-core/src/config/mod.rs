//! Configuration: endpoint settings, schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use infergate_core::config;
//!
//! let cfg = config::load_config(None);
//! let endpoint = cfg.gateway.endpoint_config();
//! println!("Gateway: {}", endpoint.base_url());
//! ```

pub mod endpoint;
pub mod loader;
pub mod schema;

pub use endpoint::EndpointConfig;
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, DiagnosticsConfig, GatewayConfig};
