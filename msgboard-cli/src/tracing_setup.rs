//! Tracing setup for the msgboard CLI
//!
//! Usage:
//!   msgboard --debug ...               # Debug logging to stderr
//!   RUST_LOG=msgboard_core=debug ...   # Fine-grained log control
//!
//! The interactive view owns the terminal, so it logs to a file instead
//! (`~/.msgboard/msgboard.log` next to the config).

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
    /// Append to this file instead of writing to stderr
    pub log_file: Option<PathBuf>,
}

fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        // Debug mode: set debug level unless RUST_LOG is explicitly set
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize tracing with console output
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config.debug))
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Initialize tracing into an append-only log file
pub fn init_file_tracing(config: &TracingConfig, path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config.debug))
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Initialize tracing based on configuration
pub fn init(config: &TracingConfig) -> Result<()> {
    match config.log_file {
        Some(ref path) => init_file_tracing(config, path.clone()),
        None => init_tracing(config),
    }
}
