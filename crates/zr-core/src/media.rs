//! Media type resolution from file names

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// MIME type of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaType(&'static str);

/// Broad file category, used by listings to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Table,
    Code,
    Image,
    Web,
    Other,
}

impl MediaType {
    pub const CSV: MediaType = MediaType("text/csv");
    pub const JSON: MediaType = MediaType("application/json");
    pub const HTML: MediaType = MediaType("text/html");
    pub const PNG: MediaType = MediaType("image/png");
    pub const JPEG: MediaType = MediaType("image/jpeg");
    pub const PDF: MediaType = MediaType("application/pdf");
    pub const OCTET_STREAM: MediaType = MediaType("application/octet-stream");

    /// Resolve the media type of a file name from its extension
    pub fn resolve(file_name: &str) -> MediaType {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::OCTET_STREAM)
    }

    /// Resolve from a bare extension (without the dot)
    pub fn from_extension(ext: &str) -> MediaType {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Self::CSV,
            "json" => Self::JSON,
            "html" => Self::HTML,
            "png" => Self::PNG,
            "jpg" | "jpeg" => Self::JPEG,
            "pdf" => Self::PDF,
            _ => Self::OCTET_STREAM,
        }
    }

    /// Get the MIME string
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether this is an image type
    pub fn is_image(&self) -> bool {
        self.0.starts_with("image/")
    }

    /// Get the listing category
    pub fn category(&self) -> FileCategory {
        match *self {
            Self::PDF => FileCategory::Document,
            Self::CSV => FileCategory::Table,
            Self::JSON => FileCategory::Code,
            Self::HTML => FileCategory::Web,
            m if m.is_image() => FileCategory::Image,
            _ => FileCategory::Other,
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::OCTET_STREAM
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_extensions() {
        assert_eq!(MediaType::resolve("a.csv").as_str(), "text/csv");
        assert_eq!(MediaType::resolve("a.json").as_str(), "application/json");
        assert_eq!(MediaType::resolve("report.html").as_str(), "text/html");
        assert_eq!(MediaType::resolve("chart.png").as_str(), "image/png");
        assert_eq!(MediaType::resolve("chart.jpg").as_str(), "image/jpeg");
        assert_eq!(MediaType::resolve("chart.jpeg").as_str(), "image/jpeg");
        assert_eq!(MediaType::resolve("doc.pdf").as_str(), "application/pdf");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(MediaType::resolve("FIELD.CSV"), MediaType::CSV);
        assert_eq!(MediaType::resolve("Chart.JpEg"), MediaType::JPEG);
    }

    #[test]
    fn test_resolve_fallback() {
        assert_eq!(MediaType::resolve("notes.txt"), MediaType::OCTET_STREAM);
        assert_eq!(MediaType::resolve("no_extension"), MediaType::OCTET_STREAM);
        assert_eq!(MediaType::resolve(""), MediaType::OCTET_STREAM);
        assert_eq!(MediaType::resolve(".hidden"), MediaType::OCTET_STREAM);
        assert_eq!(MediaType::resolve("archive.tar.gz"), MediaType::OCTET_STREAM);
    }

    #[test]
    fn test_category() {
        assert_eq!(MediaType::PNG.category(), FileCategory::Image);
        assert_eq!(MediaType::CSV.category(), FileCategory::Table);
        assert_eq!(MediaType::OCTET_STREAM.category(), FileCategory::Other);
        assert!(MediaType::JPEG.is_image());
        assert!(!MediaType::HTML.is_image());
    }
}
