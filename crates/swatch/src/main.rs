//! Swatch CLI - preview untrusted UI component snippets.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "swatch")]
#[command(about = "Preview untrusted UI component snippets in sandboxed frames")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to swatch.toml config file
    #[arg(short, long, default_value = "swatch.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default swatch.toml and an example snippet
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Start the preview server and playground
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Snippet file to show in the playground and reload on change
        #[arg(short, long)]
        watch: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Render snippets to preview documents
    Render {
        /// Snippet files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (prints to stdout for a single snippet when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a sandboxed frame embed instead of a bare document
        #[arg(long)]
        frame: bool,
    },

    /// Normalize and execute snippets, reporting warnings and faults
    Check {
        /// Snippet files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { force } => {
            commands::init::run(&cli.config, force)?;
        }
        Commands::Serve {
            port,
            watch,
            no_open,
        } => {
            let config = config::load(&cli.config)?;
            commands::serve::run(config, port, watch, !no_open).await?;
        }
        Commands::Render {
            inputs,
            output,
            frame,
        } => {
            let config = config::load(&cli.config)?;
            commands::render::run(config, &inputs, output, frame)?;
        }
        Commands::Check { inputs } => {
            let config = config::load(&cli.config)?;
            commands::check::run(config, &inputs)?;
        }
    }

    Ok(())
}
