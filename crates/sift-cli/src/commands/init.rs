//! Initialize Sift.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use sift_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Sift is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Uploads: {}", paths.upload_dir.display());
        return Ok(());
    }

    println!("{}", "Initializing Sift...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "Sift initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Check Ollama and tools: {}", "sift status".cyan());
    println!(
        "  2. Ask about a file: {}",
        "sift ask report.pdf \"What changed in Q3?\"".cyan()
    );
    println!("  3. Or start a session: {}", "sift chat report.pdf".cyan());

    Ok(())
}
