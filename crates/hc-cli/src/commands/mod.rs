//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod comment;
pub mod config;
pub mod context;
pub mod doctor;
pub mod init;
pub mod moderate;

use clap::{Parser, Subcommand};
use context::AppContext;
use moderate::{Approval, Classification};

/// has-comments - comment moderation for any record
#[derive(Debug, Parser)]
#[command(name = "has-comments")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "HAS_COMMENTS_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize has-comments in current project
    Init(init::InitArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Diagnose configuration, storage and spam service
    Doctor(doctor::DoctorArgs),

    /// Post a comment on an owner
    Post(comment::PostArgs),

    /// List an owner's comments, newest first
    List(comment::ListArgs),

    /// Show one comment
    Show(comment::ShowArgs),

    /// Approve a comment
    Approve(moderate::ApprovalArgs),

    /// Return a comment to pending
    Unapprove(moderate::ApprovalArgs),

    /// Mark a comment as spam and report it
    Spam(moderate::ClassifyArgs),

    /// Clear a comment's spam flag and report it as ham
    Ham(moderate::ClassifyArgs),

    /// Delete every comment of an owner
    Purge(comment::PurgeArgs),
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.clone().unwrap_or_else(context::default_config_path);
    let load = || AppContext::load(Some(&config_path));

    // Dispatch to command handler
    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Config(cmd) => config::execute(cmd, &config_path),
        Commands::Doctor(args) => doctor::execute(args, &config_path),
        Commands::Post(args) => comment::post(args, &load()?),
        Commands::List(args) => comment::list(args, &load()?),
        Commands::Show(args) => comment::show(args, &load()?),
        Commands::Purge(args) => comment::purge(args, &load()?),
        Commands::Approve(args) => moderate::approval(args, Approval::Approve, &load()?),
        Commands::Unapprove(args) => moderate::approval(args, Approval::Unapprove, &load()?),
        Commands::Spam(args) => moderate::classify(args, Classification::Spam, &load()?),
        Commands::Ham(args) => moderate::classify(args, Classification::Ham, &load()?),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_parse_post_with_predicates() {
        let cli = Cli::try_parse_from([
            "has-comments",
            "post",
            "-t",
            "Post",
            "-o",
            "1",
            "-b",
            "Hello",
            "--predicate",
            "open?=true",
            "--predicate",
            "members_only=false",
        ])
        .unwrap();
        match cli.command {
            Commands::Post(args) => {
                assert_eq!(args.owner.owner_type, "Post");
                assert_eq!(args.predicates.len(), 2);
                assert_eq!(args.predicates[1].0, "members_only");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_scopes_conflict() {
        let result = Cli::try_parse_from([
            "has-comments",
            "list",
            "-t",
            "Post",
            "-o",
            "1",
            "--approved",
            "--pending",
        ]);
        assert!(result.is_err());
    }
}
