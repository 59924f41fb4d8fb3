//! depot CLI — generate static package-repository indices.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "depot", version, about = "Static package repository index generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new depot project
    Init {
        /// Index name (a directory of the same name is created)
        name: String,
    },
    /// Generate the index from the configured sources
    Build {
        /// Path to depot.toml (default: search upward from cwd)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the configured output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Bypass the per-source parse cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Remove cached parse results
    Clean {
        /// Only drop entries for this locator (all entries if omitted)
        locator: Option<String>,
        /// Path to depot.toml (default: search upward from cwd)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Build {
            config,
            output_dir,
            no_cache,
        } => commands::build::run(&cwd, config.as_deref(), output_dir.as_deref(), no_cache),

        Commands::Clean { locator, config } => {
            commands::clean::run(&cwd, config.as_deref(), locator.as_deref())
        }
    }
}
