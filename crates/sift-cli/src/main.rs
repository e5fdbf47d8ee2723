//! Sift CLI - Ask questions about one file at a time

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sift - grounded answers from a single uploaded file
#[derive(Parser)]
#[command(name = "sift")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Grounded answers from a single uploaded file", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Sift (create config and working directories)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check Ollama, models and external tools
    Status,

    /// Upload a file and ask one question about it
    Ask {
        /// File to answer from
        file: PathBuf,

        /// Your question
        question: String,

        /// Image to send to the vision model with the question
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Show which parts of the file were used
        #[arg(short, long)]
        sources: bool,
    },

    /// Start an interactive session
    Chat {
        /// File to upload before the first question
        file: Option<PathBuf>,
    },

    /// Remove staged uploads and scratch files
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sift=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sift=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
        },
        Commands::Status => commands::status::run(),
        Commands::Ask {
            file,
            question,
            image,
            sources,
        } => commands::ask::run(&file, &question, image.as_deref(), sources),
        Commands::Chat { file } => commands::chat::run(file.as_deref()),
        Commands::Clear => commands::clear::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
