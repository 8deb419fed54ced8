//! Formats command
//!
//! Print the supported kind/format matrix.

use anyhow::Result;
use zr_core::{ExportKind, FormatKind};

fn matrix_row(kind: ExportKind) -> String {
    let formats: Vec<&str> = kind
        .supported_formats()
        .iter()
        .map(FormatKind::as_str)
        .collect();

    if formats.is_empty() {
        "(none)".to_string()
    } else {
        formats.join(", ")
    }
}

/// Execute the formats command
pub fn execute() -> Result<()> {
    use colored::Colorize;

    println!("{}", "Supported formats:".bold().underline());
    println!();
    for kind in ExportKind::ALL {
        println!("  {:<22} {}", kind.as_str().cyan(), matrix_row(kind));
    }

    Ok(())
}
