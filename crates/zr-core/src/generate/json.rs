//! JSON generator
//!
//! Every document is wrapped in the same envelope: `exportDate` first, then
//! the kind-specific keys, then an optional `summary`. Key order follows the
//! struct declarations below, so output is stable for a given payload.

use super::generator::{ensure_finite, GenerationContext, Generator};
use crate::artifact::Body;
use crate::error::GenerationError;
use crate::payload::{
    DayForecast, ExportPayload, FieldComparison, FieldRecord, HistoricalSeries, RecordId,
    WeatherSnapshot,
};
use crate::types::FormatKind;
use serde::{Deserialize, Serialize};

/// JSON generator
pub struct JsonGenerator {
    pretty: bool,
}

impl JsonGenerator {
    /// Create a new JSON generator
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Create a pretty-printed generator
    pub fn pretty() -> Self {
        Self::new(true)
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, GenerationError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

impl Default for JsonGenerator {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Generator for JsonGenerator {
    fn generate(
        &self,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError> {
        ensure_finite(payload)?;
        let export_date = ctx.export_date();

        let content = match payload {
            ExportPayload::FieldData { records } => self.render(&FieldDataDocument {
                export_date,
                total_fields: records.len(),
                fields: records,
            })?,
            ExportPayload::ComparativeAnalysis { comparisons } => {
                ctx.guard.check()?;
                self.render(&ComparisonDocument {
                    export_date,
                    analysis_type: "comparative_field_analysis",
                    fields: comparisons.iter().map(ComparedField::from).collect(),
                    summary: ComparisonSummary::compute(comparisons),
                })?
            }
            ExportPayload::WeatherData { current, forecast } => self.render(&WeatherDocument {
                export_date,
                current_weather: current,
                forecast,
            })?,
            other => {
                return Err(GenerationError::Unsupported {
                    kind: other.kind(),
                    format: FormatKind::Json,
                })
            }
        };

        Ok(Body::text(content, "json"))
    }

    fn format(&self) -> FormatKind {
        FormatKind::Json
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldDataDocument<'a> {
    export_date: String,
    total_fields: usize,
    fields: &'a [FieldRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherDocument<'a> {
    export_date: String,
    current_weather: &'a WeatherSnapshot,
    forecast: &'a [DayForecast],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonDocument<'a> {
    export_date: String,
    analysis_type: &'static str,
    fields: Vec<ComparedField<'a>>,
    summary: ComparisonSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparedField<'a> {
    field_id: Option<&'a RecordId>,
    field_name: Option<&'a str>,
    area: Option<f64>,
    current_metrics: CurrentMetrics,
    historical_data: Option<&'a HistoricalSeries>,
    health_score: i64,
}

#[derive(Serialize)]
struct CurrentMetrics {
    ndvi: Option<f64>,
    ndmi: Option<f64>,
    ndwi: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
}

impl<'a> From<&'a FieldComparison> for ComparedField<'a> {
    fn from(c: &'a FieldComparison) -> Self {
        let satellite = c.satellite.clone().unwrap_or_default();
        let weather = c.weather.clone().unwrap_or_default();

        Self {
            field_id: c.field.id.as_ref(),
            field_name: c.field.name.as_deref(),
            area: c.field.area,
            current_metrics: CurrentMetrics {
                ndvi: satellite.ndvi,
                ndmi: satellite.ndmi,
                ndwi: satellite.ndwi,
                temperature: weather.temperature,
                humidity: weather.humidity,
            },
            historical_data: c.historical.as_ref(),
            health_score: satellite.ndvi.map(|v| (v * 100.0).round() as i64).unwrap_or(0),
        }
    }
}

/// Aggregate over a comparative analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total_fields: usize,
    /// Mean current NDVI, missing counted as 0, rounded to 6 decimals
    #[serde(rename = "averageNDVI")]
    pub average_ndvi: f64,
    /// Name of the field with the highest NDVI; first wins on ties
    pub best_performing_field: Option<String>,
}

impl ComparisonSummary {
    /// Compute the summary for a set of comparisons
    pub fn compute(comparisons: &[FieldComparison]) -> Self {
        if comparisons.is_empty() {
            return Self {
                total_fields: 0,
                average_ndvi: 0.0,
                best_performing_field: None,
            };
        }

        let sum: f64 = comparisons.iter().map(|c| c.ndvi_or_zero()).sum();
        let mean = sum / comparisons.len() as f64;

        let mut best = &comparisons[0];
        for current in &comparisons[1..] {
            if current.ndvi_or_zero() > best.ndvi_or_zero() {
                best = current;
            }
        }

        Self {
            total_fields: comparisons.len(),
            average_ndvi: (mean * 1e6).round() / 1e6,
            best_performing_field: best.field.name.clone(),
        }
    }
}
