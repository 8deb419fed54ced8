//! Config command
//!
//! Manage zr-export configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

use zr_core::config::Config;
use zr_storage::FileSystemArtifactStore;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(super::DEFAULT_CONFIG_PATH));

    match cmd {
        ConfigCommand::Show { json } => show_config(explicit, &config_path, json),
        ConfigCommand::Init { force } => init_config(&config_path, force),
        ConfigCommand::Validate => validate_config(&config_path),
    }
}

fn default_config_toml() -> Result<String> {
    let mut config = Config::default();
    config.store.root_dir = Some(FileSystemArtifactStore::default_root());

    let body = toml::to_string_pretty(&config)?;
    Ok(format!("# zr-export configuration\n\n{}", body))
}

fn show_config(explicit: Option<&Path>, config_path: &Path, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = super::load_config(explicit)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if config_path.exists() {
        println!("{}", config_path.display().to_string().dimmed());
    } else {
        println!("{}", "(defaults)".dimmed());
    }
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists at {}. Use {} to overwrite.",
            "⚠".yellow(),
            config_path.display(),
            "--force".cyan()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(config_path, default_config_toml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green(),
        config_path.display()
    );
    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    use colored::Colorize;

    if !config_path.exists() {
        anyhow::bail!("Configuration not found at {}", config_path.display());
    }

    let content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Invalid TOML in {}", config_path.display()))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("{} Configuration is valid", "✓".green());

    // Unknown sections are ignored by serde, so point them out
    if let Ok(toml::Value::Table(table)) = toml::from_str::<toml::Value>(&content) {
        for key in table.keys().filter(|k| *k != "store" && *k != "export") {
            println!("{} Unknown section [{}] is ignored", "⚠".yellow(), key);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses() {
        let content = default_config_toml().unwrap();
        let config: Config = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.store.root_dir.is_some());
    }

    #[test]
    fn test_init_then_validate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        init_config(&path, false).unwrap();
        assert!(path.exists());
        validate_config(&path).unwrap();
    }

    #[test]
    fn test_init_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store]\nretention_cap = 4\n").unwrap();

        init_config(&path, false).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[store]\nretention_cap = 4\n"
        );
    }

    #[test]
    fn test_validate_rejects_bad_delimiter() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[export]\ncsv_delimiter = \"::\"\n").unwrap();

        assert!(validate_config(&path).is_err());
    }
}
