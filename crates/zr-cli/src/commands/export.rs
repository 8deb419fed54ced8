//! Export command
//!
//! Turn a payload file into a stored artifact.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use zr_core::config::Config;
use zr_core::generate::{CaptureError, RenderTarget};
use zr_core::{
    ExportCoordinator, ExportKind, ExportOptions, ExportPayload, ExportRequest, ExportState,
    FormatKind, Locale,
};

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Payload file (JSON, tagged with its `kind`)
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output format: csv, json, html or image
    #[arg(long, short)]
    pub format: FormatKind,

    /// Export kind; must match the payload when given
    #[arg(long, short)]
    pub kind: Option<ExportKind>,

    /// Rendered chart (PNG or JPEG) for image exports
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Report language (en, ar)
    #[arg(long)]
    pub locale: Option<Locale>,

    /// Export directory
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Abort after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// A chart already rendered to a file
struct ChartFile(PathBuf);

impl RenderTarget for ChartFile {
    fn capture_to_image(&self) -> std::result::Result<Vec<u8>, CaptureError> {
        std::fs::read(&self.0)
            .map_err(|e| CaptureError(format!("Failed to read {}: {}", self.0.display(), e)))
    }
}

fn read_payload(path: &Path) -> Result<ExportPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid payload in {}", path.display()))
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Execute the export command
pub fn execute(args: ExportArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let payload = read_payload(&args.input)?;
    let store = super::open_store(config, args.store.as_deref(), None)?;
    let root = store.root().to_path_buf();

    let bar = spinner();
    let progress = bar.clone();
    let coordinator = ExportCoordinator::from_config(Arc::new(store), config).with_observer(
        move |kind, state| {
            let step = match state {
                ExportState::Requested => "Preparing",
                ExportState::Generating => "Generating",
                ExportState::Writing => "Writing",
                ExportState::Succeeded | ExportState::Failed => return,
            };
            progress.set_message(format!("{} {}...", step, kind));
        },
    );

    let chart = args.chart.clone().map(ChartFile);
    let mut request = ExportRequest::new(args.format, &payload);
    if let Some(kind) = args.kind {
        request.kind = kind;
    }
    if let Some(chart) = &chart {
        request = request.with_render_target(chart);
    }

    let options = ExportOptions {
        locale: args.locale,
        timeout: args.timeout.map(Duration::from_secs),
        ..Default::default()
    };

    let result = coordinator.export(&request, &options);
    bar.finish_and_clear();

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(e) => {
            if e.offers_retry() {
                eprintln!("{} Export failed; you can retry.", "⚠".yellow());
            }
            return Err(e).context(format!("Export to {} failed", root.display()));
        }
    };

    eprintln!(
        "{} Exported {} ({}, {})",
        "✓".green(),
        artifact.name.cyan(),
        artifact.media_type,
        artifact.display_size()
    );
    println!("{}", artifact.path.display());

    Ok(())
}
