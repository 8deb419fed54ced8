//! Delete command
//!
//! Remove one stored artifact.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use zr_core::config::Config;
use zr_core::ArtifactStorage;

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Artifact file name, as shown by `list`
    pub name: String,

    /// Skip confirmation
    #[arg(long, short)]
    pub yes: bool,

    /// Export directory
    #[arg(long)]
    pub store: Option<PathBuf>,
}

/// Execute the delete command
pub fn execute(args: DeleteArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let store = super::open_store(config, args.store.as_deref(), None)?;
    let artifact = store
        .find(&args.name)?
        .with_context(|| format!("Export '{}' not found", args.name))?;

    if !args.yes {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} ({})?",
                artifact.name,
                artifact.display_size()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    store
        .delete(&artifact.path)
        .with_context(|| format!("Failed to delete {}", artifact.name))?;

    println!("{} Deleted {}", "✓".green(), artifact.name);
    Ok(())
}
