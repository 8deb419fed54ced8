//! Format generators
//!
//! Generators are pure converters from an [`ExportPayload`](crate::payload::ExportPayload) to a
//! [`Body`](crate::artifact::Body).
//! None of them touches the file system; persisting the body is the job of
//! an [`ArtifactStorage`](crate::artifact::ArtifactStorage).
//!
//! # Overview
//!
//! - CSV (field list, weather forecast)
//! - JSON (field list, comparative analysis, weather)
//! - HTML report (comprehensive report, comparative analysis)
//! - Image capture (charts supplied through a [`RenderTarget`])
//!
//! # Example
//!
//! ```ignore
//! use zr_core::generate::{GenerationContext, GeneratorRegistry};
//!
//! let registry = GeneratorRegistry::new();
//! let body = registry.generate(FormatKind::Csv, &payload, &GenerationContext::now())?;
//! ```

mod generator;
mod html;
mod image;
mod json;
mod tabular;

pub use self::generator::{GenerationContext, Generator, GeneratorRegistry};
pub use self::html::{HtmlReportGenerator, ReportStrings};
pub use self::image::{CaptureError, ImageCaptureGenerator, RenderTarget};
pub use self::json::{ComparisonSummary, JsonGenerator};
pub use self::tabular::CsvGenerator;
