//! `infergate check`: run the diagnostics and render the report.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use infergate_core::config::DiagnosticsConfig;
use infergate_core::EndpointConfig;
use infergate_diagnostics::{run_diagnostics, DiagnosticOptions, DiagnosticReport, Verdict};

/// Run the check command. The exit code reflects the critical stages.
pub async fn run(endpoint: &EndpointConfig, diagnostics: &DiagnosticsConfig) -> Result<ExitCode> {
    println!();
    println!("{}", "Infergate Gateway Check".cyan().bold());
    println!();
    println!("  {:<18} {}", "Gateway:".bold(), endpoint.base_url());
    println!("  {:<18} {}", "Completion model:".bold(), endpoint.completion_model());
    println!("  {:<18} {}", "Embedding model:".bold(), endpoint.embedding_model());
    println!();

    let report = run_diagnostics(endpoint, DiagnosticOptions::from(diagnostics))
        .await
        .context("invalid gateway configuration")?;

    print_report(&report);

    Ok(ExitCode::from(report.exit_code() as u8))
}

fn badge(verdict: Verdict) -> ColoredString {
    let label = format!("[{:^7}]", verdict.label());
    match verdict {
        Verdict::Pass => label.green().bold(),
        Verdict::Fail => label.red().bold(),
        Verdict::Limited | Verdict::Warn => label.yellow().bold(),
    }
}

fn print_report(report: &DiagnosticReport) {
    for (i, result) in report.results().iter().enumerate() {
        println!(
            "  {} {}. {} {}",
            badge(result.verdict),
            i + 1,
            result.name().bold(),
            format!("({} ms)", result.elapsed.as_millis()).dimmed()
        );
        println!("      {}", result.detail);
        for hint in &result.hints {
            println!("      {} {}", "→".dimmed(), hint.dimmed());
        }
    }

    println!();
    if report.is_healthy() {
        println!("{}", "Gateway is usable.".green().bold());
    } else {
        println!(
            "{}",
            "Gateway check failed: chat or embeddings are unavailable.".red().bold()
        );
    }
    println!();
}
