//! `infergate init`: write a starter `~/.infergate/config.json`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use infergate_core::config::{get_config_path, save_config, Config};

/// Run the init command. An existing file is left untouched.
///
/// The written file holds the currently resolved values, so
/// `INFERGATE_BASE_URL=... infergate init` seeds it from the environment.
pub fn run(config: &Config, path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Infergate Setup".cyan().bold());
    println!();

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(config, Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "Next: set gateway.baseUrl, then run `infergate check`.".dimmed()
    );
    println!();
    Ok(())
}
