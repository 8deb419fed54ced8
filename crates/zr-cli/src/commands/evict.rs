//! Evict command
//!
//! Enforce the retention cap on the export directory.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use zr_core::config::Config;
use zr_core::ExportCoordinator;

/// Arguments for the evict command
#[derive(Debug, Args)]
pub struct EvictArgs {
    /// Number of artifacts to keep (defaults to store.retention_cap)
    #[arg(long)]
    pub cap: Option<usize>,

    /// Export directory
    #[arg(long)]
    pub store: Option<PathBuf>,
}

/// Execute the evict command
pub fn execute(args: EvictArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    if args.cap == Some(0) {
        anyhow::bail!("--cap must be at least 1");
    }

    let store = super::open_store(config, args.store.as_deref(), args.cap)?;
    let coordinator = ExportCoordinator::from_config(Arc::new(store), config);

    let removed = coordinator.enforce_retention()?;
    if removed.is_empty() {
        println!("Nothing to evict.");
        return Ok(());
    }

    for artifact in &removed {
        println!("  {} {}", "-".red(), artifact.name.dimmed());
    }
    println!("{} Evicted {} export(s)", "✓".green(), removed.len());

    Ok(())
}
