//! Chart image capture

use super::generator::{GenerationContext, Generator};
use crate::artifact::Body;
use crate::error::GenerationError;
use crate::payload::ExportPayload;
use crate::types::FormatKind;
use thiserror::Error;
use tracing::debug;

/// Failure reported by a render target
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CaptureError(pub String);

/// A chart or view owned by the caller that can be rendered to an image
pub trait RenderTarget: Send + Sync {
    /// Render the target; returns encoded PNG or JPEG bytes once complete
    fn capture_to_image(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Generator that captures the context's render target
pub struct ImageCaptureGenerator;

impl ImageCaptureGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageCaptureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ImageCaptureGenerator {
    fn generate(
        &self,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError> {
        let target = ctx
            .render_target
            .ok_or(GenerationError::MissingRenderTarget)?;

        let bytes = target
            .capture_to_image()
            .map_err(|e| GenerationError::CaptureFailed(e.to_string()))?;

        // the render pipeline may have outlived the deadline
        ctx.guard.check()?;

        let extension = match infer::get(&bytes).map(|t| t.mime_type()) {
            Some("image/png") => "png",
            Some("image/jpeg") => "jpg",
            Some(other) => {
                return Err(GenerationError::CaptureFailed(format!(
                    "unsupported image encoding {}",
                    other
                )))
            }
            None => {
                return Err(GenerationError::CaptureFailed(
                    "unrecognized image encoding".to_string(),
                ))
            }
        };

        debug!(
            "Captured {} chart ({} bytes) for {}",
            extension,
            bytes.len(),
            payload.kind()
        );
        Ok(Body::binary(bytes, extension))
    }

    fn format(&self) -> FormatKind {
        FormatKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{FieldComparison, WeatherSnapshot};

    const PNG_HEADER: [u8; 16] = [
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ];
    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    struct StaticChart(Vec<u8>);

    impl RenderTarget for StaticChart {
        fn capture_to_image(&self) -> Result<Vec<u8>, CaptureError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenChart;

    impl RenderTarget for BrokenChart {
        fn capture_to_image(&self) -> Result<Vec<u8>, CaptureError> {
            Err(CaptureError("view not mounted".to_string()))
        }
    }

    fn payload() -> ExportPayload {
        ExportPayload::ComparativeAnalysis {
            comparisons: vec![FieldComparison::default()],
        }
    }

    #[test]
    fn test_capture_png() {
        let chart = StaticChart(PNG_HEADER.to_vec());
        let ctx = GenerationContext::now().with_render_target(&chart);
        let body = ImageCaptureGenerator::new().generate(&payload(), &ctx).unwrap();
        assert_eq!(body.extension, "png");
        assert_eq!(body.as_bytes(), &PNG_HEADER);
    }

    #[test]
    fn test_capture_jpeg() {
        let chart = StaticChart(JPEG_HEADER.to_vec());
        let ctx = GenerationContext::now().with_render_target(&chart);
        let payload = ExportPayload::WeatherData {
            current: WeatherSnapshot::default(),
            forecast: vec![],
        };
        let body = ImageCaptureGenerator::new().generate(&payload, &ctx).unwrap();
        assert_eq!(body.extension, "jpg");
        assert!(body.media_type().is_image());
    }

    #[test]
    fn test_missing_render_target() {
        let result = ImageCaptureGenerator::new().generate(&payload(), &GenerationContext::now());
        assert!(matches!(result, Err(GenerationError::MissingRenderTarget)));
    }

    #[test]
    fn test_capture_failure_propagates() {
        let ctx = GenerationContext::now().with_render_target(&BrokenChart);
        let result = ImageCaptureGenerator::new().generate(&payload(), &ctx);
        match result {
            Err(GenerationError::CaptureFailed(msg)) => assert!(msg.contains("not mounted")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let chart = StaticChart(b"not an image".to_vec());
        let ctx = GenerationContext::now().with_render_target(&chart);
        let result = ImageCaptureGenerator::new().generate(&payload(), &ctx);
        assert!(matches!(result, Err(GenerationError::CaptureFailed(_))));
    }
}
