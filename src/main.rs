//! Codemodel CLI - Builds a code model from recorded discovery events

mod commands;

use clap::{Parser, Subcommand};
use codemodel::config::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "codemodel")]
#[command(version)]
#[command(about = "Semantic model builder - packages, types and references from parser events")]
#[command(long_about = r#"
Codemodel replays the constructs a parser discovered (JSON Lines, one event
per line) and assembles the cross-referenced code model:
  • Types grouped by package, with built-ins in pseudo-packages
  • Forward references resolved against the final model
  • Class guesses replaced once the real interface is declared

Example usage:
  codemodel init
  codemodel build --events build/events.jsonl
  codemodel build --events build/events.jsonl --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the model from a discovery-event file
    Build {
        /// JSON Lines file of discovery events
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Path to the config file (defaults to codemodel.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print the version
    Version {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Build {
            events,
            format,
            config,
        } => commands::run_build(events, format, config.as_deref()),
        Commands::Init { path, force } => commands::run_init(path, force),
        Commands::Version { format } => commands::run_version(format),
    }
}
