//! Configuration management for zr-export

use crate::artifact::DEFAULT_RETENTION_CAP;
use crate::types::Locale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact store settings
    pub store: StoreConfig,
    /// Export settings
    pub export: ExportConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.store.retention_cap == 0 {
            return Err("store.retention_cap must be at least 1".to_string());
        }
        if self.export.csv_delimiter.chars().count() != 1
            || !self.export.csv_delimiter.is_ascii()
        {
            return Err(format!(
                "export.csv_delimiter must be a single ASCII character, got {:?}",
                self.export.csv_delimiter
            ));
        }
        if matches!(self.export.timeout_secs, Some(0)) {
            return Err("export.timeout_secs must be positive when set".to_string());
        }
        Ok(())
    }
}

/// Artifact store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Export directory; the platform data directory when unset
    pub root_dir: Option<PathBuf>,
    /// Maximum number of artifacts kept
    pub retention_cap: usize,
    /// Enforce the cap after every successful export
    pub auto_evict: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            retention_cap: DEFAULT_RETENTION_CAP,
            auto_evict: true,
        }
    }
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Language of HTML reports
    pub default_locale: Locale,
    /// Overrides the localized report title
    pub report_title: Option<String>,
    /// CSV delimiter
    pub csv_delimiter: String,
    /// Pretty-print JSON
    pub pretty_json: bool,
    /// Abort generation and writing after this many seconds
    pub timeout_secs: Option<u64>,
}

impl ExportConfig {
    /// Delimiter as a byte, falling back to a comma
    pub fn csv_delimiter_byte(&self) -> u8 {
        match self.csv_delimiter.as_bytes() {
            [b] => *b,
            _ => b',',
        }
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::En,
            report_title: None,
            csv_delimiter: ",".to_string(),
            pretty_json: true,
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.retention_cap, 10);
        assert!(config.store.auto_evict);
        assert!(config.export.pretty_json);
        assert_eq!(config.export.csv_delimiter_byte(), b',');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[store]"));
        assert!(toml.contains("[export]"));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.store.retention_cap, config2.store.retention_cap);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [store]
            retention_cap = 3

            [export]
            default_locale = "ar"
            csv_delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.retention_cap, 3);
        assert!(config.store.auto_evict);
        assert_eq!(config.export.default_locale, Locale::Ar);
        assert_eq!(config.export.csv_delimiter_byte(), b';');
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.store.retention_cap = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.export.csv_delimiter = "||".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.export.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }
}
