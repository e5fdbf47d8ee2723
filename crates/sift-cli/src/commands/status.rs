//! Status command - check the services and tools sift depends on.

use super::{get_paths, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use sift_ollama::OllamaClient;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let paths = get_paths()?;
    let config = load_config(&paths)?;

    println!("{}", "Sift Status".cyan().bold());
    println!("{}", "─".repeat(50));

    let client =
        OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    println!();
    println!("{}", "Ollama".white().bold());
    if rt.block_on(client.is_available()) {
        println!("  {} Reachable at {}", "●".green(), client.host());

        let models = [
            ("text", &config.ollama.model),
            ("vision", &config.ollama.vision_model),
            ("embedding", &config.ollama.embedding_model),
        ];
        for (role, model) in models {
            match rt.block_on(client.has_model(model)) {
                Ok(true) => println!("  {} {} model: {}", "●".green(), role, model),
                Ok(false) => println!(
                    "  {} {} model: {} {}",
                    "○".yellow(),
                    role,
                    model,
                    format!("(run 'ollama pull {}')", model).dimmed()
                ),
                Err(e) => println!("  {} {} model: {} ({})", "✗".red(), role, model, e),
            }
        }
    } else {
        println!(
            "  {} Not running at {}. Start it with 'ollama serve'.",
            "✗".red(),
            client.host()
        );
    }

    println!();
    println!("{}", "External Tools".white().bold());
    for (tool, available) in sift_process::check_dependencies() {
        if available {
            println!("  {} {}", "●".green(), tool);
        } else {
            println!("  {} {}", "✗".red(), tool);
        }
    }
    if !sift_process::all_tools_available() {
        println!(
            "  {}",
            "Audio and video uploads need ffmpeg, ffprobe and whisper on PATH.".dimmed()
        );
    }

    let upload_dir = config.upload_dir(&paths);
    let staged = std::fs::read_dir(&upload_dir)
        .map(|entries| entries.flatten().filter(|e| e.path().is_file()).count())
        .unwrap_or(0);

    println!();
    println!("{}", "Workspace".white().bold());
    println!("  Uploads: {} ({} staged)", upload_dir.display(), staged);
    println!("  Scratch: {}", config.scratch_dir(&paths).display());

    Ok(())
}
