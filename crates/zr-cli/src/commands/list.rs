//! List command
//!
//! Show stored artifacts, most recent first.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use zr_core::config::Config;
use zr_core::media::FileCategory;
use zr_core::ArtifactStorage;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Limit number of artifacts
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Export directory
    #[arg(long)]
    pub store: Option<PathBuf>,
}

fn category_label(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Document => "doc",
        FileCategory::Table => "table",
        FileCategory::Code => "code",
        FileCategory::Image => "image",
        FileCategory::Web => "web",
        FileCategory::Other => "file",
    }
}

/// Execute the list command
pub fn execute(args: ListArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let store = super::open_store(config, args.store.as_deref(), None)?;
    let artifacts = store.list()?;
    let total = artifacts.len();
    let shown: Vec<_> = match args.limit {
        Some(limit) => artifacts.into_iter().take(limit).collect(),
        None => artifacts,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No exports found.");
        return Ok(());
    }

    println!("{}", "Exports:".bold().underline());
    println!("{}", store.root().display().to_string().dimmed());
    println!();

    for artifact in &shown {
        println!(
            "  {:<5} {} {} ({})",
            category_label(artifact.media().category()),
            artifact.name.green(),
            artifact.display_size().cyan(),
            artifact
                .modified_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
    }

    if total > shown.len() {
        println!(
            "\n  {} Showing {} of {} exports. Use --limit to show more.",
            "ℹ".blue(),
            shown.len(),
            total
        );
    }

    let cap = store.retention_cap();
    if total > cap {
        println!(
            "  {} {} exports exceed the retention cap of {}. Run '{}'.",
            "⚠".yellow(),
            total,
            cap,
            "zr-export evict".cyan()
        );
    }

    Ok(())
}
