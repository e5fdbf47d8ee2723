//! Clear command - remove staged uploads and scratch files.

use super::build_engine;
use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let (_, engine) = build_engine()?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    let report = rt.block_on(engine.clear());

    println!(
        "{} Removed {} file(s) from {}",
        "✓".green(),
        report.removed.len(),
        engine.workspace().upload_dir().display()
    );
    for failure in &report.failures {
        println!(
            "  {} {} ({})",
            "✗".red(),
            failure.path.display(),
            failure.error.dimmed()
        );
    }

    Ok(())
}
