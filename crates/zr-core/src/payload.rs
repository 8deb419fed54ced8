//! Export payloads
//!
//! Payloads arrive already fetched and shaped by the data provider. Every
//! member is optional: the generators decide how a missing value renders.

use crate::types::ExportKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier as delivered by the remote API (numeric or string)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Geographic position of a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Satellite vegetation indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationIndices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndvi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndwi: Option<f64>,
}

/// A field as listed by the remote API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    /// Area in hectares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellite_data: Option<VegetationIndices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
}

impl FieldRecord {
    /// Create a record with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Current NDVI, if the satellite pass produced one
    pub fn ndvi(&self) -> Option<f64> {
        self.satellite_data.as_ref().and_then(|s| s.ndvi)
    }
}

/// Minimal field identity used by comparisons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
}

/// Weather reading attached to a compared field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Historical index series, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalSeries {
    pub ndvi: Vec<f64>,
    pub ndmi: Vec<f64>,
}

/// One field's entry in a comparative analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldComparison {
    pub field: FieldSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellite: Option<VegetationIndices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical: Option<HistoricalSeries>,
}

impl FieldComparison {
    /// Current NDVI, missing treated as zero
    pub fn ndvi_or_zero(&self) -> f64 {
        self.satellite.as_ref().and_then(|s| s.ndvi).unwrap_or(0.0)
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// km/h
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    /// hPa
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One forecast day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayForecast {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Millimetres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Style class used by the HTML report
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Field or weather alert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Data handed to the export pipeline, one variant per export kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportPayload {
    FieldData {
        #[serde(default)]
        records: Vec<FieldRecord>,
    },
    ComparativeAnalysis {
        #[serde(default)]
        comparisons: Vec<FieldComparison>,
    },
    WeatherData {
        #[serde(default)]
        current: WeatherSnapshot,
        #[serde(default)]
        forecast: Vec<DayForecast>,
    },
    ComprehensiveReport {
        #[serde(default)]
        fields: Vec<FieldRecord>,
        #[serde(default)]
        weather: Option<WeatherSnapshot>,
        #[serde(default)]
        alerts: Vec<Alert>,
        #[serde(default)]
        comparisons: Vec<FieldComparison>,
    },
    SatelliteImages {
        #[serde(rename = "fieldId")]
        field_id: RecordId,
    },
}

impl ExportPayload {
    /// Get the export kind of this payload
    pub fn kind(&self) -> ExportKind {
        match self {
            ExportPayload::FieldData { .. } => ExportKind::FieldData,
            ExportPayload::ComparativeAnalysis { .. } => ExportKind::ComparativeAnalysis,
            ExportPayload::WeatherData { .. } => ExportKind::WeatherData,
            ExportPayload::ComprehensiveReport { .. } => ExportKind::ComprehensiveReport,
            ExportPayload::SatelliteImages { .. } => ExportKind::SatelliteImages,
        }
    }

    /// Find the first non-finite number in the payload, by member label
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let mut numbers: Vec<(&'static str, Option<f64>)> = Vec::new();

        match self {
            ExportPayload::FieldData { records } => {
                records.iter().for_each(|r| push_field(&mut numbers, r));
            }
            ExportPayload::ComparativeAnalysis { comparisons } => {
                comparisons.iter().for_each(|c| push_comparison(&mut numbers, c));
            }
            ExportPayload::WeatherData { current, forecast } => {
                push_weather(&mut numbers, current);
                for day in forecast {
                    numbers.push(("forecast.temp", day.temp));
                    numbers.push(("forecast.humidity", day.humidity));
                    numbers.push(("forecast.rainfall", day.rainfall));
                }
            }
            ExportPayload::ComprehensiveReport {
                fields,
                weather,
                comparisons,
                ..
            } => {
                fields.iter().for_each(|r| push_field(&mut numbers, r));
                if let Some(weather) = weather {
                    push_weather(&mut numbers, weather);
                }
                comparisons.iter().for_each(|c| push_comparison(&mut numbers, c));
            }
            ExportPayload::SatelliteImages { .. } => {}
        }

        numbers
            .into_iter()
            .find(|(_, v)| v.map(|v| !v.is_finite()).unwrap_or(false))
            .map(|(label, _)| label)
    }
}

fn push_indices(out: &mut Vec<(&'static str, Option<f64>)>, indices: Option<&VegetationIndices>) {
    if let Some(s) = indices {
        out.push(("ndvi", s.ndvi));
        out.push(("ndmi", s.ndmi));
        out.push(("ndwi", s.ndwi));
    }
}

fn push_field(out: &mut Vec<(&'static str, Option<f64>)>, record: &FieldRecord) {
    out.push(("area", record.area));
    out.push(("healthScore", record.health_score));
    if let Some(loc) = &record.location {
        out.push(("location.latitude", loc.latitude));
        out.push(("location.longitude", loc.longitude));
    }
    push_indices(out, record.satellite_data.as_ref());
}

fn push_comparison(out: &mut Vec<(&'static str, Option<f64>)>, comparison: &FieldComparison) {
    out.push(("field.area", comparison.field.area));
    push_indices(out, comparison.satellite.as_ref());
    if let Some(w) = &comparison.weather {
        out.push(("weather.temperature", w.temperature));
        out.push(("weather.humidity", w.humidity));
    }
    if let Some(h) = &comparison.historical {
        out.extend(h.ndvi.iter().map(|v| ("historical.ndvi", Some(*v))));
        out.extend(h.ndmi.iter().map(|v| ("historical.ndmi", Some(*v))));
    }
}

fn push_weather(out: &mut Vec<(&'static str, Option<f64>)>, weather: &WeatherSnapshot) {
    out.push(("temperature", weather.temperature));
    out.push(("humidity", weather.humidity));
    out.push(("windSpeed", weather.wind_speed));
    out.push(("pressure", weather.pressure));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind() {
        let payload = ExportPayload::FieldData { records: vec![] };
        assert_eq!(payload.kind(), ExportKind::FieldData);

        let payload = ExportPayload::SatelliteImages {
            field_id: RecordId::Number(7),
        };
        assert_eq!(payload.kind(), ExportKind::SatelliteImages);
    }

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"{
            "kind": "field_data",
            "records": [{
                "id": 1,
                "name": "Field A",
                "cropType": "Wheat",
                "area": 5.2,
                "location": {"latitude": 30.1, "longitude": 31.2},
                "satelliteData": {"ndvi": 0.75},
                "healthScore": 75
            }]
        }"#;

        let payload: ExportPayload = serde_json::from_str(json).unwrap();
        let ExportPayload::FieldData { records } = payload else {
            panic!("expected field data");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(RecordId::Number(1)));
        assert_eq!(records[0].crop_type.as_deref(), Some("Wheat"));
        assert_eq!(records[0].ndvi(), Some(0.75));
        assert_eq!(records[0].health_score, Some(75.0));
    }

    #[test]
    fn test_alert_severity_default() {
        let alert: Alert = serde_json::from_str(r#"{"title": "t", "message": "m"}"#).unwrap();
        assert_eq!(alert.severity, Severity::Info);
        assert_eq!(Severity::Warning.css_class(), "warning");
    }

    #[test]
    fn test_first_non_finite() {
        let mut record = FieldRecord::named("A");
        record.area = Some(f64::NAN);
        let payload = ExportPayload::FieldData {
            records: vec![record],
        };
        assert_eq!(payload.first_non_finite(), Some("area"));

        let payload = ExportPayload::FieldData {
            records: vec![FieldRecord::named("B")],
        };
        assert_eq!(payload.first_non_finite(), None);
    }

    #[test]
    fn test_comparison_ndvi_default() {
        let comparison = FieldComparison::default();
        assert_eq!(comparison.ndvi_or_zero(), 0.0);
    }
}
