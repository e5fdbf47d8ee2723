//! Chat command - interactive question answering over the uploaded file.

use super::{
    build_engine, expand_path, file_name, get_paths, print_answer, print_load_report, spinner,
};
use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sift_engine::RagEngine;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

struct Session {
    engine: RagEngine,
    rt: Runtime,
    /// Attached to every question until replaced or detached.
    image: Option<PathBuf>,
}

/// Run the interactive session.
pub fn run(file: Option<&Path>) -> Result<()> {
    let (_, engine) = build_engine()?;
    let rt = Runtime::new().context("Failed to create async runtime")?;
    let mut session = Session {
        engine,
        rt,
        image: None,
    };

    let mut rl = DefaultEditor::new()?;
    let history_path = get_paths()?.data_dir.join("chat_history");
    let _ = rl.load_history(&history_path);

    println!("{}", "Sift Chat".cyan().bold());
    println!("{}", "─".repeat(50));
    println!(
        "Type {} for commands, {} to exit. Anything else is a question.",
        ":help".cyan(),
        ":quit".cyan()
    );
    println!();

    if let Some(file) = file {
        if let Err(e) = session.upload(file) {
            eprintln!("{} {:#}", "Error:".red(), e);
        }
    }

    loop {
        let readline = rl.readline(&format!("{} ", "sift>".green().bold()));
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match session.execute(line) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    println!("Goodbye!");
    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

impl Session {
    /// Handle one line. Returns `false` when the session should end.
    fn execute(&mut self, input: &str) -> Result<bool> {
        if !input.starts_with(':') {
            self.ask(input)?;
            return Ok(true);
        }

        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (input, ""),
        };

        match cmd {
            ":help" | ":h" => print_help(),
            ":quit" | ":exit" | ":q" => return Ok(false),
            ":upload" | ":u" => {
                if arg.is_empty() {
                    println!("Usage: :upload <path>");
                } else {
                    self.upload(&expand_path(arg)?)?;
                }
            }
            ":image" | ":i" => {
                if arg.is_empty() {
                    if self.image.take().is_some() {
                        println!("{} Image detached", "✓".green());
                    } else {
                        println!("Usage: :image <path>");
                    }
                } else {
                    let staged = self
                        .rt
                        .block_on(self.engine.stage_image(&expand_path(arg)?))?;
                    println!(
                        "{} {} will be sent with each question",
                        "✓".green(),
                        file_name(&staged).white().bold()
                    );
                    self.image = Some(staged);
                }
            }
            ":clear" => {
                let report = self.rt.block_on(self.engine.clear());
                self.image = None;
                println!(
                    "{} Knowledge cleared ({} file(s) removed)",
                    "✓".green(),
                    report.removed.len()
                );
                for failure in &report.failures {
                    println!("  {} {} ({})", "✗".red(), failure.path.display(), failure.error);
                }
            }
            ":status" => self.status(),
            _ => println!(
                "{} Unknown command: '{}'. Type {} for help.",
                "?".yellow(),
                cmd,
                ":help".cyan()
            ),
        }
        Ok(true)
    }

    fn upload(&mut self, path: &Path) -> Result<()> {
        let pb = spinner(format!("Indexing {}", path.display()))?;
        let report = self.rt.block_on(self.engine.upload(path));
        pb.finish_and_clear();

        let report = report?;
        // The upload purged the staged image along with the previous file.
        self.image = None;
        print_load_report(&report);
        Ok(())
    }

    fn ask(&self, question: &str) -> Result<()> {
        let pb = spinner("Thinking...")?;
        let state = self
            .rt
            .block_on(self.engine.ask(question, self.image.as_deref()));
        pb.finish_and_clear();

        print_answer(&state, false);
        Ok(())
    }

    fn status(&self) {
        match self.rt.block_on(self.engine.summary()) {
            Some(summary) => println!(
                "  {} {} chunks indexed {} at {}",
                "●".green(),
                summary.chunks,
                format!("[{}]", summary.id).dimmed(),
                summary.created_at.format("%H:%M:%S")
            ),
            None => println!("  {} No file loaded", "○".yellow()),
        }
        match &self.image {
            Some(image) => println!("  {} Image: {}", "●".green(), file_name(image)),
            None => println!("  {} No image attached", "○".dimmed()),
        }
    }
}

fn print_help() {
    println!("{}", "Available Commands:".cyan().bold());
    println!();
    println!("  {}    Replace the knowledge with a file", ":upload <path>".white());
    println!("  {}     Attach an image to questions", ":image <path>".white());
    println!("  {}            Detach the image", ":image".white());
    println!("  {}            Forget the file and purge uploads", ":clear".white());
    println!("  {}           Show what is loaded", ":status".white());
    println!("  {}             Exit", ":quit".white());
    println!();
}
