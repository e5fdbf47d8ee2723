//! CLI command implementations.

pub mod ask;
pub mod chat;
pub mod clear;
pub mod config;
pub mod init;
pub mod status;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sift_config::{AppPaths, Config};
use sift_engine::{LoadOutcome, LoadReport, QueryState, RagEngine};
use std::path::Path;
use std::time::Duration;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(paths: &AppPaths) -> Result<Config> {
    Config::load_from(&paths.config_file)
        .with_context(|| format!("Failed to load {}", paths.config_file.display()))
}

/// Build an engine from the on-disk configuration.
pub fn build_engine() -> Result<(Config, RagEngine)> {
    let paths = get_paths()?;
    let config = load_config(&paths)?;
    let engine = RagEngine::from_config(&config, &paths).context("Failed to set up engine")?;
    Ok((config, engine))
}

/// A steadily ticking spinner with a message.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Expand `~` and environment variables in a user-typed path.
pub fn expand_path(raw: &str) -> Result<std::path::PathBuf> {
    let expanded = shellexpand::full(raw).with_context(|| format!("Cannot expand {}", raw))?;
    Ok(std::path::PathBuf::from(expanded.as_ref()))
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn print_load_report(report: &LoadReport) {
    let name = file_name(&report.path);
    match &report.outcome {
        LoadOutcome::Indexed { index_id, chunks } => {
            println!(
                "  {} Indexed {} ({}, {} segments, {} chunks) {}",
                "✓".green(),
                name.white().bold(),
                report.kind,
                report.segments,
                chunks,
                format!("[{}]", index_id).dimmed()
            );
        }
        LoadOutcome::Empty { reason } => {
            println!(
                "  {} Nothing indexed from {}: {}",
                "!".yellow(),
                name.white().bold(),
                reason
            );
        }
    }
    if let Some(hash) = &report.content_hash {
        println!("    {}", format!("sha256 {}", hash).dimmed());
    }
}

pub fn print_answer(state: &QueryState, show_sources: bool) {
    println!("{}", "Answer:".green().bold());
    println!();
    println!("{}", state.answer.as_deref().unwrap_or_default());
    println!();

    if show_sources && !state.chunks.is_empty() {
        println!("{}", "─".repeat(70));
        println!("{}", "Sources:".cyan().bold());
        for (i, chunk) in state.chunks.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                chunk.source.to_string().white(),
                format!("[chunk {}]", chunk.ordinal).dimmed()
            );
        }
    }
    if let Some(route) = state.route {
        tracing::debug!("Answered via {:?}", route);
    }
}
