//! `infergate status`: show the resolved configuration.
//!
//! Values come from the config file plus `INFERGATE_*` overrides, the same
//! resolution every other command uses. The API key is never printed.

use std::path::Path;

use colored::Colorize;

use infergate_core::config::{get_config_path, Config};

use crate::helpers;

/// Run the status command.
pub fn run(config: &Config, path: Option<&Path>) {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    let gateway = &config.gateway;

    println!();
    println!("{}", "Infergate Status".cyan().bold());
    println!();

    println!(
        "  {:<20} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!("  {:<20} {}", "Base URL:".bold(), or_unset(&gateway.base_url));
    println!(
        "  {:<20} {}",
        "API key:".bold(),
        match gateway.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => helpers::mask_key(key),
            _ => "· none".dimmed().to_string(),
        }
    );
    println!("  {:<20} {}", "Completion model:".bold(), or_unset(&gateway.completion_model));
    println!("  {:<20} {}", "Embedding model:".bold(), or_unset(&gateway.embedding_model));
    println!(
        "  {:<20} {}",
        "Parameters:".bold(),
        format!(
            "timeout: {} ms | max_tokens: {} | expected dims: {}",
            gateway.request_timeout_ms,
            gateway.max_output_tokens,
            config.diagnostics.expected_dimensions
        )
        .dimmed()
    );

    let missing = gateway.missing_required();
    if !missing.is_empty() {
        println!();
        helpers::print_missing(&missing);
    }
    println!();
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "(not set)".red().to_string()
    } else {
        value.to_string()
    }
}
