//! Caption CLI - upload images and generate captions through the pipeline API.
//!
//! Each input image goes through four calls: presign, upload, register,
//! caption. Results are written as JSON run reports.
//!
//! # Usage
//!
//! ```bash
//! # Caption one image (token taken from $CAPTION_ACCESS_TOKEN by default)
//! caption run dog.jpg
//!
//! # Several images, one JSON line per run, token re-read from a file
//! caption run ./shots/*.png --token-file ~/.session-token -f jsonl -o captions.jsonl
//!
//! # View configuration
//! caption config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Caption - upload images and generate captions through the pipeline API.
#[derive(Parser, Debug)]
#[command(name = "caption")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload images and generate captions for them
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match caption_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `caption config path`."
            );
            caption_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("caption v{}", caption_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
