//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod delete;
pub mod evict;
pub mod export;
pub mod formats;
pub mod list;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use zr_core::config::Config;
use zr_storage::FileSystemArtifactStore;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = ".zr-export/config.toml";

/// zr-export - farm data export and report artifacts
#[derive(Debug, Parser)]
#[command(name = "zr-export")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export a payload to an artifact
    Export(export::ExportArgs),

    /// List stored artifacts, newest first
    List(list::ListArgs),

    /// Delete a stored artifact
    Delete(delete::DeleteArgs),

    /// Remove artifacts beyond the retention cap
    Evict(evict::EvictArgs),

    /// Show which formats each export kind supports
    Formats,

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.as_deref();

    // Dispatch to command handler
    match cli.command {
        Commands::Export(args) => export::execute(args, &load_config(config_path)?),
        Commands::List(args) => list::execute(args, &load_config(config_path)?),
        Commands::Delete(args) => delete::execute(args, &load_config(config_path)?),
        Commands::Evict(args) => evict::execute(args, &load_config(config_path)?),
        Commands::Formats => formats::execute(),
        // Config commands handle missing or broken files themselves
        Commands::Config(cmd) => config::execute(cmd, config_path),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration
///
/// An explicit path must exist; the default path falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Open the artifact store, `--store` taking precedence over configuration
pub fn open_store(
    config: &Config,
    store_override: Option<&Path>,
    cap_override: Option<usize>,
) -> Result<FileSystemArtifactStore> {
    let root = store_override
        .map(Path::to_path_buf)
        .or_else(|| config.store.root_dir.clone())
        .unwrap_or_else(FileSystemArtifactStore::default_root);
    let cap = cap_override.unwrap_or(config.store.retention_cap);

    FileSystemArtifactStore::new(&root, cap)
        .with_context(|| format!("Failed to open export directory {}", root.display()))
}
