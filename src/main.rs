//! Palette - UI component generator
//!
//! Detects a front-end project's stack, packs the most relevant project
//! context into a token budget and asks Claude for components that fit.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod ai;
mod cli;
mod config;
mod context;
mod error;
mod project;
mod ui;

/// Palette - context-aware UI component generator
#[derive(Parser)]
#[command(name = "palette")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate UI components that fit your project", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PALETTE_CONFIG")]
    config: Option<String>,

    /// Project directory (defaults to the current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a component from a description
    Generate {
        /// What to build
        prompt: String,

        /// Output directory for generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Token budget for system and user prompts
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Skip project analysis and context packing
        #[arg(long)]
        no_context: bool,

        /// Print the prompts without calling the model
        #[arg(long)]
        dry_run: bool,

        /// Overwrite existing files without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Show the detected project configuration
    Detect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the context that would be packed for a prompt
    Context {
        /// Request to optimize for
        prompt: String,

        /// Token budget for system and user prompts
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive setup wizard
    Init,

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },

    /// Show version and system info
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        ui::style::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Initialize logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref())?;
    config.verbose = cli.verbose;

    let root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    debug!("Palette v{} in {}", env!("CARGO_PKG_VERSION"), root.display());

    match cli.command {
        Commands::Generate {
            prompt,
            output,
            max_tokens,
            no_context,
            dry_run,
            force,
        } => {
            let options = cli::generate::GenerateOptions {
                output,
                max_tokens,
                no_context,
                dry_run,
                force,
            };
            cli::generate::run(config, &root, &prompt, options).await?;
        }
        Commands::Detect { json } => {
            cli::detect::run(&config, &root, json)?;
        }
        Commands::Context { prompt, max_tokens, json } => {
            cli::context::run(&config, &root, &prompt, max_tokens, json)?;
        }
        Commands::Init => {
            cli::init::run(config, cli.config.as_deref(), &root)?;
        }
        Commands::Config { show, init } => {
            if init {
                config::init_config(cli.config.as_deref())?;
            } else if show {
                config::show_config(&config)?;
            } else {
                println!("Use --show to print the configuration or --init to create it");
            }
        }
        Commands::Info => {
            cli::info::run(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}
