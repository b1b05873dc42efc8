//! Config command
//!
//! Inspect has-comments configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use hc_core::Config;
use std::fs;
use std::path::Path;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration
    Validate,

    /// Print the configuration file path
    Path,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(config_path, json),
        ConfigCommand::Validate => validate_config(config_path),
        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn show_config(path: &Path, as_json: bool) -> Result<()> {
    let config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if path.exists() {
        println!("{}", "Configuration:".bold().underline());
        println!("{}", path.display().to_string().dimmed());
    } else {
        eprintln!(
            "{} {} not found, showing defaults. Run '{}' to create it.",
            "⚠".yellow(),
            path.display(),
            "has-comments init".cyan()
        );
    }
    println!();
    println!("{}", config.to_toml_string()?);
    Ok(())
}

fn validate_config(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Configuration not found at {}", path.display()))?;
    let config = Config::from_toml_str(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    println!("{} Configuration is valid", "✓".green());
    if config.owners.is_empty() {
        println!(
            "{} No [owners.*] sections; every owner type uses the defaults",
            "⚠".yellow()
        );
    } else {
        let names: Vec<&str> = config.owners.keys().map(String::as_str).collect();
        println!("{} Owner types: {}", "✓".green(), names.join(", "));
    }
    if !config.akismet.is_enabled() {
        println!("{} Spam checking disabled (no akismet.key)", "⚠".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_missing_config_fails() {
        let temp = tempfile::tempdir().unwrap();
        assert!(validate_config(&temp.path().join("config.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[akismet]\ntimeout_secs = 0\n").unwrap();
        assert!(validate_config(&path).is_err());

        fs::write(&path, "[owners.Post]\nopen = false\n").unwrap();
        assert!(validate_config(&path).is_ok());
    }
}
