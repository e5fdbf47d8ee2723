//! Ask command - upload one file and answer one question from it.

use super::{build_engine, print_answer, print_load_report, spinner};
use anyhow::{Context, Result};
use colored::Colorize;
use sift_ollama::OllamaClient;
use std::path::Path;
use tokio::runtime::Runtime;

pub fn run(file: &Path, question: &str, image: Option<&Path>, show_sources: bool) -> Result<()> {
    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }
    if let Some(image) = image {
        if !image.is_file() {
            anyhow::bail!("Image not found: {}", image.display());
        }
    }

    let (config, engine) = build_engine()?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    let client =
        OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;
    if !rt.block_on(client.is_available()) {
        anyhow::bail!(
            "Ollama is not running at {}. Start it with 'ollama serve'.",
            config.ollama.host
        );
    }

    let pb = spinner(format!("Indexing {}", file.display()))?;
    let report = rt.block_on(engine.upload(file));
    pb.finish_and_clear();
    print_load_report(&report.context("Upload failed")?);

    let image = match image {
        Some(image) => Some(
            rt.block_on(engine.stage_image(image))
                .context("Failed to stage image")?,
        ),
        None => None,
    };

    println!();
    println!("{} {}", "Question:".cyan().bold(), question);
    println!("{}", "─".repeat(70));
    println!();

    let pb = spinner("Thinking...")?;
    let state = rt.block_on(engine.ask(question, image.as_deref()));
    pb.finish_and_clear();

    print_answer(&state, show_sources);
    Ok(())
}
