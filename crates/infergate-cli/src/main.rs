//! Infergate CLI: entry point.
//!
//! # Commands
//!
//! - `infergate check [--expected-dimensions N]`: run the gateway diagnostics
//! - `infergate init`: write a starter config file
//! - `infergate status`: show the resolved configuration
//! - `infergate chat -m MESSAGE [--system S] [--stream]`: single-shot chat
//! - `infergate embed TEXT...`: embed texts and print their dimensions

mod check;
mod helpers;
mod init;
mod status;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures_util::StreamExt;
use tracing::debug;

use infergate_core::config::{load_config, Config};
use infergate_core::{ChatMessage, EndpointConfig};
use infergate_diagnostics::truncate_string;
use infergate_providers::{ChatBackend, ChatClient, EmbeddingBackend, EmbeddingClient};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Infergate: connectivity checks for OpenAI-compatible inference gateways
#[derive(Parser)]
#[command(name = "infergate", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.infergate/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-stage gateway diagnostics
    Check {
        /// Embedding dimensionality the vector index expects
        #[arg(long)]
        expected_dimensions: Option<usize>,
    },

    /// Write a starter config file
    Init,

    /// Show the resolved configuration
    Status,

    /// Send one message to the completion model
    Chat {
        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Optional system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Print tokens as they arrive
        #[arg(long, default_value_t = false)]
        stream: bool,
    },

    /// Embed one or more texts
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.logs);
    if let Ok(path) = dotenv {
        debug!("loaded environment from {}", path.display());
    }

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Init => {
            init::run(&config, cli.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status => {
            status::run(&config, cli.config.as_deref());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            expected_dimensions,
        } => {
            let Some(endpoint) = require_endpoint(&config) else {
                return Ok(ExitCode::FAILURE);
            };
            let mut diagnostics = config.diagnostics.clone();
            if let Some(dims) = expected_dimensions {
                diagnostics.expected_dimensions = dims;
            }
            check::run(&endpoint, &diagnostics).await
        }
        Commands::Chat {
            message,
            system,
            stream,
        } => {
            let Some(endpoint) = require_endpoint(&config) else {
                return Ok(ExitCode::FAILURE);
            };
            run_chat(endpoint, message, system, stream).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Embed { texts } => {
            let Some(endpoint) = require_endpoint(&config) else {
                return Ok(ExitCode::FAILURE);
            };
            run_embed(endpoint, &texts).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve the endpoint, or print which required settings are missing.
fn require_endpoint(config: &Config) -> Option<EndpointConfig> {
    let missing = config.gateway.missing_required();
    if missing.is_empty() {
        return Some(config.gateway.endpoint_config());
    }
    helpers::print_missing(&missing);
    None
}

// ─────────────────────────────────────────────
// chat / embed
// ─────────────────────────────────────────────

async fn run_chat(
    endpoint: EndpointConfig,
    message: String,
    system: Option<String>,
    stream: bool,
) -> Result<()> {
    let client = ChatClient::new(endpoint);

    let mut conversation = Vec::with_capacity(2);
    if let Some(system) = system {
        conversation.push(ChatMessage::system(system));
    }
    conversation.push(ChatMessage::human(message));

    helpers::print_model_header(client.model());

    if stream {
        let mut deltas = client
            .stream(&conversation)
            .await
            .context("failed to open chat stream")?;
        let mut stdout = std::io::stdout();
        while let Some(delta) = deltas.next().await {
            let text = delta.context("chat stream interrupted")?;
            print!("{text}");
            stdout.flush().context("failed to write to stdout")?;
        }
        println!();
    } else {
        let response = client
            .invoke(&conversation)
            .await
            .context("chat completion failed")?;
        println!("{}", response.content);
        if let Some(usage) = response.usage {
            println!(
                "{}",
                format!(
                    "tokens: {} prompt + {} completion",
                    usage.prompt_tokens, usage.completion_tokens
                )
                .dimmed()
            );
        }
    }
    println!();
    Ok(())
}

async fn run_embed(endpoint: EndpointConfig, texts: &[String]) -> Result<()> {
    let client = EmbeddingClient::new(endpoint).context("invalid gateway configuration")?;
    let vectors = client
        .embed_batch(texts)
        .await
        .context("embedding request failed")?;

    helpers::print_model_header(client.model());
    for (text, vector) in texts.iter().zip(&vectors) {
        println!(
            "  {:<40} {} dims  {}",
            truncate_string(text, 40),
            vector.len(),
            helpers::preview(vector).dimmed()
        );
    }
    println!();
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("infergate=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
