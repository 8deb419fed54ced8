//! Generator trait and registry

use super::image::RenderTarget;
use crate::artifact::{Body, CancelGuard};
use crate::config::ExportConfig;
use crate::error::GenerationError;
use crate::payload::ExportPayload;
use crate::types::{FormatKind, Locale};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Per-request inputs shared by all generators
pub struct GenerationContext<'a> {
    /// Timestamp embedded in generated documents
    pub exported_at: DateTime<Utc>,
    /// Language of human-readable output
    pub locale: Locale,
    /// Cancellation and timeout
    pub guard: CancelGuard,
    /// Chart or view to capture for image exports
    pub render_target: Option<&'a dyn RenderTarget>,
}

impl<'a> GenerationContext<'a> {
    /// Context stamped with the current time
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Context stamped with a fixed time
    pub fn at(exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at,
            locale: Locale::default(),
            guard: CancelGuard::none(),
            render_target: None,
        }
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Set the cancellation guard
    pub fn with_guard(mut self, guard: CancelGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Set the render target
    pub fn with_render_target(mut self, target: &'a dyn RenderTarget) -> Self {
        self.render_target = Some(target);
        self
    }

    /// ISO-8601 export timestamp with millisecond precision
    pub fn export_date(&self) -> String {
        self.exported_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Trait for format generators
pub trait Generator: Send + Sync {
    /// Convert a payload to a body
    fn generate(
        &self,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError>;

    /// Get the output format
    fn format(&self) -> FormatKind;
}

/// Reject payloads carrying NaN or infinite numbers
pub(crate) fn ensure_finite(payload: &ExportPayload) -> Result<(), GenerationError> {
    match payload.first_non_finite() {
        Some(label) => Err(GenerationError::SerializationFailed(format!(
            "non-finite number in {}",
            label
        ))),
        None => Ok(()),
    }
}

/// Registry of generators, one per format
pub struct GeneratorRegistry {
    generators: HashMap<FormatKind, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Create a registry with the default generators
    pub fn new() -> Self {
        Self::from_config(&ExportConfig::default())
    }

    /// Create a registry with generators tuned by configuration
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut registry = Self {
            generators: HashMap::new(),
        };

        registry.register(Box::new(
            super::tabular::CsvGenerator::new().with_delimiter(config.csv_delimiter_byte()),
        ));
        registry.register(Box::new(super::json::JsonGenerator::new(config.pretty_json)));
        registry.register(Box::new(
            super::html::HtmlReportGenerator::new().with_title(config.report_title.clone()),
        ));
        registry.register(Box::new(super::image::ImageCaptureGenerator::new()));

        registry
    }

    /// Register a generator, replacing any existing one for its format
    pub fn register(&mut self, generator: Box<dyn Generator>) {
        self.generators.insert(generator.format(), generator);
    }

    /// Generate a body, checking the kind/format pair first
    pub fn generate(
        &self,
        format: FormatKind,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError> {
        let kind = payload.kind();
        if !kind.supports(format) {
            return Err(GenerationError::Unsupported { kind, format });
        }

        let generator = self
            .generators
            .get(&format)
            .ok_or(GenerationError::Unsupported { kind, format })?;

        ctx.guard.check()?;
        generator.generate(payload, ctx)
    }

    /// Check if a format has a generator
    pub fn has_format(&self, format: FormatKind) -> bool {
        self.generators.contains_key(&format)
    }

    /// Get list of registered formats
    pub fn available_formats(&self) -> Vec<FormatKind> {
        let mut formats: Vec<_> = self.generators.keys().copied().collect();
        formats.sort();
        formats
    }

    /// Get a generator by format
    pub fn get(&self, format: FormatKind) -> Option<&dyn Generator> {
        self.generators.get(&format).map(|g| g.as_ref())
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{FieldRecord, RecordId};
    use crate::types::ExportKind;

    struct UpperCsv;

    impl Generator for UpperCsv {
        fn generate(
            &self,
            _payload: &ExportPayload,
            _ctx: &GenerationContext<'_>,
        ) -> Result<Body, GenerationError> {
            Ok(Body::text("A,B\n", "csv"))
        }

        fn format(&self) -> FormatKind {
            FormatKind::Csv
        }
    }

    fn fields() -> ExportPayload {
        ExportPayload::FieldData {
            records: vec![FieldRecord::named("Field A")],
        }
    }

    #[test]
    fn test_registry_defaults() {
        let registry = GeneratorRegistry::new();
        assert_eq!(registry.available_formats(), FormatKind::ALL.to_vec());
        assert!(registry.get(FormatKind::Html).is_some());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Box::new(UpperCsv));

        let body = registry
            .generate(FormatKind::Csv, &fields(), &GenerationContext::now())
            .unwrap();
        assert_eq!(body.as_text(), Some("A,B\n"));
    }

    #[test]
    fn test_unsupported_pair() {
        let registry = GeneratorRegistry::new();
        let result = registry.generate(FormatKind::Html, &fields(), &GenerationContext::now());
        assert!(matches!(
            result,
            Err(GenerationError::Unsupported {
                kind: ExportKind::FieldData,
                format: FormatKind::Html
            })
        ));
    }

    #[test]
    fn test_satellite_images_never_supported() {
        let registry = GeneratorRegistry::new();
        let payload = ExportPayload::SatelliteImages {
            field_id: RecordId::Text("f-1".to_string()),
        };
        for format in FormatKind::ALL {
            let result = registry.generate(format, &payload, &GenerationContext::now());
            assert!(matches!(result, Err(GenerationError::Unsupported { .. })));
        }
    }

    #[test]
    fn test_export_date_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ctx = GenerationContext::at(at);
        assert_eq!(ctx.export_date(), "2024-03-01T08:30:00.000Z");
    }
}
