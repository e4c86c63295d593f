use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use msgboard_core::config::{BoardConfig, SessionConfig, StoreConfig};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config file
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Print the effective config (after ${VAR} expansion)
    Show,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Username to act as
    #[arg(long)]
    pub username: Option<String>,

    /// Message service base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
    }
}

fn starter_config(args: &InitArgs) -> BoardConfig {
    let mut store = StoreConfig::default();
    if let Some(ref endpoint) = args.endpoint {
        store.endpoint = endpoint.clone();
    }

    BoardConfig {
        store,
        session: SessionConfig {
            // Leave the env reference in place so one file serves several users
            username: Some(
                args.username
                    .clone()
                    .unwrap_or_else(|| "${USER}".to_string()),
            ),
        },
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = BoardConfig::config_path();

    // Check if config already exists
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    starter_config(&args)
        .save_to(&config_path)
        .context("Failed to write starter config")?;

    println!("✅ Created config at: {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {:?}", config_path);
    println!("  2. Point [store].endpoint at your message service");
    println!("  3. Run: msgboard list");

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", BoardConfig::config_path().display());
    Ok(())
}

fn run_show() -> Result<()> {
    let config = BoardConfig::load()?;
    println!("{}", config.to_toml()?);
    Ok(())
}
