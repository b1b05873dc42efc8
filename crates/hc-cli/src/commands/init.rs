//! Init command
//!
//! Initialize has-comments configuration in a project.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Add an [owners.<TYPE>] section with default options (repeatable)
    #[arg(long = "owner-type", short = 't')]
    pub owner_types: Vec<String>,

    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,

    /// Directory to initialize (default: current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Execute the init command
pub fn execute(args: InitArgs) -> Result<()> {
    use colored::Colorize;

    let project_dir = args
        .path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    println!("Initializing has-comments in {}...", project_dir.display());

    let hc_dir = project_dir.join(".has-comments");
    let config_path = hc_dir.join("config.toml");
    if config_path.exists() && !args.force {
        eprintln!(
            "{} has-comments already initialized. Use --force to reinitialize.",
            "⚠".yellow()
        );
        return Ok(());
    }

    fs::create_dir_all(hc_dir.join("data")).context("Failed to create .has-comments/")?;
    println!("{} Created .has-comments/ directory", "✓".green());

    fs::write(&config_path, generate_config(&args.owner_types))
        .context("Failed to write config.toml")?;
    println!("{} Generated config.toml", "✓".green());

    if project_dir.join(".git").exists() {
        update_gitignore(&project_dir)?;
        println!("{} Updated .gitignore", "✓".green());
    }

    println!("\n{}", "Next steps:".bold());
    println!("  1. Review .has-comments/config.toml and add your owner types");
    println!("  2. Set [akismet] key and blog to enable spam checking");
    println!("  3. Post your first comment:");
    println!();
    println!(
        "     {}",
        "has-comments post -t Post -o 1 -n arjan -e arjan@arjan.com -b \"Hello\"".cyan()
    );
    println!(
        "\nTip: Run '{}' to verify your setup",
        "has-comments doctor".cyan()
    );

    Ok(())
}

fn generate_config(owner_types: &[String]) -> String {
    let mut config = String::from(
        r#"# has-comments configuration

[storage]
# Comment files, relative to the working directory
data_dir = ".has-comments/data"

[akismet]
# Leave key empty to disable spam checking
key = ""
blog = ""
endpoint = "https://rest.akismet.com/1.1"
timeout_secs = 5

[moderation]
# Record a spam verdict when the spam service cannot answer
inconclusive_as_spam = false

# Options per owner type. Rules take true/false or the name of a predicate
# supplied with `post --predicate NAME=VALUE`.
#
# [owners.Post]
# open = true
# authorisation = true
# require_approval = "auto"   # true, false or "auto"
# check_spam = false
# reject_on_spam = false
"#,
    );

    for owner_type in owner_types {
        config.push_str(&format!(
            r#"
[owners.{}]
open = true
authorisation = true
require_approval = "auto"
check_spam = false
reject_on_spam = false
"#,
            owner_type
        ));
    }

    config
}

fn update_gitignore(project_dir: &Path) -> Result<()> {
    let gitignore_path = project_dir.join(".gitignore");
    let entries = "\n# has-comments\n.has-comments/data/\n";

    if gitignore_path.exists() {
        let content = fs::read_to_string(&gitignore_path)?;
        if !content.contains(".has-comments/data/") {
            let mut file = fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            use std::io::Write;
            file.write_all(entries.as_bytes())?;
        }
    } else {
        fs::write(&gitignore_path, entries)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::{Config, RequireApproval};

    #[test]
    fn test_generated_config_parses() {
        let config = Config::from_toml_str(&generate_config(&[])).unwrap();
        assert!(!config.akismet.is_enabled());
        assert!(config.owners.is_empty());
    }

    #[test]
    fn test_generated_config_with_owner_types() {
        let text = generate_config(&["Post".to_string(), "Page".to_string()]);
        let config = Config::from_toml_str(&text).unwrap();
        assert_eq!(config.owners.len(), 2);
        assert_eq!(
            config.options_for("Post").require_approval,
            RequireApproval::Auto
        );
    }

    #[test]
    fn test_update_gitignore_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(".gitignore"), "target/\n").unwrap();

        update_gitignore(temp.path()).unwrap();
        update_gitignore(temp.path()).unwrap();

        let content = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".has-comments/data/").count(), 1);
        assert!(content.starts_with("target/"));
    }
}
