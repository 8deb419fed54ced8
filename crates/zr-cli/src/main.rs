//! zr-export - farm data export CLI
//!
//! Turns field, weather and comparative-analysis payloads into CSV, JSON,
//! HTML and chart-image artifacts, and manages the export directory.
//!
//! ## Quick Start
//!
//! ```bash
//! # Export field data as CSV
//! zr-export export --format csv --input fields.json
//!
//! # See what is stored
//! zr-export list
//!
//! # Trim the export directory to the retention cap
//! zr-export evict
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
