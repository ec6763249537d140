//! The `caption config` command: inspect and create the config file.

use std::path::Path;

use caption_core::Config;
use clap::{Args, Subcommand};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (inline tokens are masked)
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with every default filled in
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let path = Config::default_path();
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            print!("{}", render_show(&config, &path)?);
        }
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Init { force } => {
            init_file(&path, force)?;
            tracing::info!("Wrote default config to {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }
    Ok(())
}

/// Header comments naming where the config and the token come from, followed
/// by the redacted TOML.
fn render_show(config: &Config, path: &Path) -> anyhow::Result<String> {
    let origin = if path.exists() {
        path.display().to_string()
    } else {
        "built-in defaults (no config file)".to_string()
    };
    Ok(format!(
        "# loaded from: {origin}\n# access token: {}\n\n{}",
        config.token_source(),
        config.redacted().to_toml()?
    ))
}

fn init_file(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
