//! Configuration commands.

use super::{get_paths, load_config};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));

    if paths.config_file.exists() {
        let contents = std::fs::read_to_string(&paths.config_file)
            .context("Failed to read config file")?;
        load_config(&paths)?;
        println!("{}", contents);
    } else {
        println!(
            "{}",
            "No config file yet, showing defaults. Run 'sift init' to create one.".dimmed()
        );
        println!();
        println!("{}", sift_config::Config::default_config_string());
    }

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}
