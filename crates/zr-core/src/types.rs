//! Core type definitions for zr-export

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of dataset being exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Field list with vegetation indices
    FieldData,
    /// Side-by-side comparison of several fields
    ComparativeAnalysis,
    /// Current conditions plus forecast
    WeatherData,
    /// Fields, weather and alerts in one document
    ComprehensiveReport,
    /// Satellite imagery for one field
    SatelliteImages,
}

impl ExportKind {
    /// All export kinds in display order
    pub const ALL: [ExportKind; 5] = [
        ExportKind::FieldData,
        ExportKind::ComparativeAnalysis,
        ExportKind::WeatherData,
        ExportKind::ComprehensiveReport,
        ExportKind::SatelliteImages,
    ];

    /// Get the string representation, also used as the artifact base name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::FieldData => "field_data",
            ExportKind::ComparativeAnalysis => "comparative_analysis",
            ExportKind::WeatherData => "weather_data",
            ExportKind::ComprehensiveReport => "comprehensive_report",
            ExportKind::SatelliteImages => "satellite_images",
        }
    }

    /// Formats this kind can be exported as
    pub fn supported_formats(&self) -> &'static [FormatKind] {
        match self {
            ExportKind::FieldData => &[FormatKind::Csv, FormatKind::Json],
            ExportKind::ComparativeAnalysis => {
                &[FormatKind::Json, FormatKind::Html, FormatKind::Image]
            }
            ExportKind::WeatherData => &[FormatKind::Csv, FormatKind::Json, FormatKind::Image],
            ExportKind::ComprehensiveReport => &[FormatKind::Html],
            ExportKind::SatelliteImages => &[],
        }
    }

    /// Check whether the given format is supported for this kind
    pub fn supports(&self, format: FormatKind) -> bool {
        self.supported_formats().contains(&format)
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('-', "_");
        ExportKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("Unknown export kind: {}", s))
    }
}

/// Output format of a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Csv,
    Json,
    Html,
    Image,
}

impl FormatKind {
    /// All formats
    pub const ALL: [FormatKind; 4] = [
        FormatKind::Csv,
        FormatKind::Json,
        FormatKind::Html,
        FormatKind::Image,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Csv => "csv",
            FormatKind::Json => "json",
            FormatKind::Html => "html",
            FormatKind::Image => "image",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FormatKind::Csv),
            "json" => Ok(FormatKind::Json),
            "html" => Ok(FormatKind::Html),
            "image" | "png" | "jpg" | "jpeg" => Ok(FormatKind::Image),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Report language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// Get the BCP 47 language tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Whether text in this locale runs right to left
    pub fn is_rtl(&self) -> bool {
        matches!(self, Locale::Ar)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Parses a language tag, ignoring any region suffix (`ar-EG` is `ar`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match lang.as_str() {
            "en" => Ok(Locale::En),
            "ar" => Ok(Locale::Ar),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}
