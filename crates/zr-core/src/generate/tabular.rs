//! CSV generator

use super::generator::{ensure_finite, GenerationContext, Generator};
use crate::artifact::Body;
use crate::error::GenerationError;
use crate::payload::{DayForecast, ExportPayload, FieldRecord, WeatherSnapshot};
use crate::types::FormatKind;

const FIELD_HEADER: [&str; 9] = [
    "Field Name",
    "Crop Type",
    "Area (hectares)",
    "Planting Date",
    "Location",
    "NDVI",
    "NDMI",
    "NDWI",
    "Health Score",
];

const WEATHER_HEADER: [&str; 5] = ["Date", "Temperature", "Humidity", "Rainfall", "Wind Speed"];

/// Rows between cancellation checks
const CHECK_EVERY: usize = 256;

/// CSV generator with standard quoting
pub struct CsvGenerator {
    delimiter: u8,
}

impl CsvGenerator {
    /// Create a comma-delimited generator
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the delimiter byte
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn write_rows<I>(
        &self,
        header: &[&str],
        rows: I,
        ctx: &GenerationContext<'_>,
    ) -> Result<String, GenerationError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(header)?;
        for (i, row) in rows.into_iter().enumerate() {
            if i % CHECK_EVERY == 0 {
                ctx.guard.check()?;
            }
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| GenerationError::SerializationFailed(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| GenerationError::SerializationFailed(e.to_string()))
    }
}

impl Default for CsvGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for CsvGenerator {
    fn generate(
        &self,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError> {
        ensure_finite(payload)?;

        let content = match payload {
            ExportPayload::FieldData { records } => {
                self.write_rows(&FIELD_HEADER, records.iter().map(field_row), ctx)?
            }
            ExportPayload::WeatherData { current, forecast } => self.write_rows(
                &WEATHER_HEADER,
                forecast.iter().map(|day| weather_row(day, current)),
                ctx,
            )?,
            other => {
                return Err(GenerationError::Unsupported {
                    kind: other.kind(),
                    format: FormatKind::Csv,
                })
            }
        };

        Ok(Body::text(content, "csv"))
    }

    fn format(&self) -> FormatKind {
        FormatKind::Csv
    }
}

fn number_or_zero(value: Option<f64>) -> String {
    format!("{}", value.unwrap_or(0.0))
}

fn index(value: Option<f64>) -> String {
    format!("{:.3}", value.unwrap_or(0.0))
}

fn field_row(record: &FieldRecord) -> Vec<String> {
    let location = record.location.clone().unwrap_or_default();
    let indices = record.satellite_data.clone().unwrap_or_default();

    vec![
        record.name.clone().unwrap_or_default(),
        record.crop_type.clone().unwrap_or_default(),
        number_or_zero(record.area),
        record.planting_date.clone().unwrap_or_default(),
        format!(
            "{}, {}",
            location.latitude.unwrap_or(0.0),
            location.longitude.unwrap_or(0.0)
        ),
        index(indices.ndvi),
        index(indices.ndmi),
        index(indices.ndwi),
        number_or_zero(record.health_score),
    ]
}

fn weather_row(day: &DayForecast, current: &WeatherSnapshot) -> Vec<String> {
    vec![
        day.date.clone().unwrap_or_default(),
        number_or_zero(day.temp),
        number_or_zero(day.humidity),
        number_or_zero(day.rainfall),
        number_or_zero(current.wind_speed),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::CancelGuard;
    use crate::payload::{Location, VegetationIndices};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    fn field_a() -> FieldRecord {
        FieldRecord {
            name: Some("Field A".to_string()),
            crop_type: Some("Wheat".to_string()),
            area: Some(5.2),
            satellite_data: Some(VegetationIndices {
                ndvi: Some(0.75),
                ndmi: Some(0.45),
                ndwi: Some(0.25),
            }),
            health_score: Some(75.0),
            ..Default::default()
        }
    }

    fn generate(payload: &ExportPayload) -> String {
        let body = CsvGenerator::new()
            .generate(payload, &GenerationContext::now())
            .unwrap();
        assert_eq!(body.extension, "csv");
        body.as_text().unwrap().to_string()
    }

    #[test]
    fn test_field_row_matches_reference() {
        let csv = generate(&ExportPayload::FieldData {
            records: vec![field_a()],
        });

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Field Name,Crop Type,Area (hectares),Planting Date,Location,NDVI,NDMI,NDWI,Health Score"
        );
        assert_eq!(lines[1], "Field A,Wheat,5.2,,\"0, 0\",0.750,0.450,0.250,75");
    }

    #[test]
    fn test_line_count_is_records_plus_header() {
        let records: Vec<_> = (0..7).map(|i| FieldRecord::named(format!("F{}", i))).collect();
        let csv = generate(&ExportPayload::FieldData { records });
        assert_eq!(csv.lines().count(), 8);
    }

    #[test]
    fn test_missing_values_render_defaults() {
        let csv = generate(&ExportPayload::FieldData {
            records: vec![FieldRecord::default()],
        });
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, ",,0,,\"0, 0\",0.000,0.000,0.000,0");
        assert!(!csv.contains("null"));
        assert!(!csv.contains("undefined"));
    }

    #[test]
    fn test_location_composite() {
        let mut record = FieldRecord::named("North");
        record.location = Some(Location {
            latitude: Some(30.05),
            longitude: Some(31.25),
        });
        let csv = generate(&ExportPayload::FieldData {
            records: vec![record],
        });
        assert!(csv.contains("\"30.05, 31.25\""));
    }

    #[test]
    fn test_free_text_is_escaped() {
        let mut record = FieldRecord::named("Smith, \"East\" plot");
        record.crop_type = Some("Maize\nlate".to_string());
        let csv = generate(&ExportPayload::FieldData {
            records: vec![record],
        });

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "Smith, \"East\" plot");
        assert_eq!(&row[1], "Maize\nlate");
        assert_eq!(row.len(), 9);
    }

    #[test]
    fn test_weather_csv() {
        let payload = ExportPayload::WeatherData {
            current: WeatherSnapshot {
                wind_speed: Some(12.0),
                ..Default::default()
            },
            forecast: vec![
                DayForecast {
                    date: Some("2024-01-01".to_string()),
                    temp: Some(29.0),
                    humidity: Some(68.0),
                    rainfall: Some(0.0),
                },
                DayForecast {
                    date: Some("2024-01-02".to_string()),
                    temp: Some(27.5),
                    humidity: Some(72.0),
                    rainfall: Some(5.0),
                },
            ],
        };

        let csv = generate(&payload);
        assert_eq!(
            csv,
            "Date,Temperature,Humidity,Rainfall,Wind Speed\n\
             2024-01-01,29,68,0,12\n\
             2024-01-02,27.5,72,5,12\n"
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let body = CsvGenerator::new()
            .with_delimiter(b';')
            .generate(
                &ExportPayload::FieldData {
                    records: vec![field_a()],
                },
                &GenerationContext::now(),
            )
            .unwrap();
        let text = body.as_text().unwrap();
        assert!(text.starts_with("Field Name;Crop Type;"));
        assert!(text.contains(";0, 0;"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut record = field_a();
        record.health_score = Some(f64::INFINITY);
        let result = CsvGenerator::new().generate(
            &ExportPayload::FieldData {
                records: vec![record],
            },
            &GenerationContext::now(),
        );
        assert!(matches!(result, Err(GenerationError::SerializationFailed(_))));
    }

    #[test]
    fn test_cancelled_generation() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = GenerationContext::now().with_guard(CancelGuard::new(Some(token), None));
        let result = CsvGenerator::new().generate(
            &ExportPayload::FieldData {
                records: vec![field_a()],
            },
            &ctx,
        );
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }
}
