//! Doctor command
//!
//! Diagnose configuration, storage and the spam service.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hc_akismet::{AkismetClient, KeyStatus};
use hc_core::{CommentableOptions, Config, PolicyRule};
use hc_storage::FileSystemStore;
use std::path::Path;

/// Arguments for the doctor command
#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Skip checks that call the spam service
    #[arg(long)]
    pub offline: bool,

    /// Show suggestions for every check
    #[arg(long)]
    pub details: bool,
}

/// Check result
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl CheckResult {
    fn new(status: CheckStatus, name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.to_string(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn ok(name: &str, message: &str) -> Self {
        Self::new(CheckStatus::Ok, name, message, None)
    }

    fn warn(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self::new(CheckStatus::Warn, name, message, suggestion)
    }

    fn fail(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self::new(CheckStatus::Fail, name, message, suggestion)
    }
}

/// Execute the doctor command
pub fn execute(args: DoctorArgs, config_path: &Path) -> Result<()> {
    let mut all = Vec::new();

    println!("\n{}", "1. Configuration".bold().underline());
    let (config, results) = check_configuration(config_path);
    print_results(&results, args.details);
    all.extend(results);

    println!("\n{}", "2. Storage".bold().underline());
    let results = check_storage(&config);
    print_results(&results, args.details);
    all.extend(results);

    println!("\n{}", "3. Spam Service".bold().underline());
    let results = check_spam_service(&config, args.offline);
    print_results(&results, args.details);
    all.extend(results);

    println!("\n{}", "4. Owner Types".bold().underline());
    let results = check_owner_types(&config);
    print_results(&results, args.details);
    all.extend(results);

    let warnings: Vec<_> = all.iter().filter(|r| r.status == CheckStatus::Warn).collect();
    let errors: Vec<_> = all.iter().filter(|r| r.status == CheckStatus::Fail).collect();

    println!(
        "\n{}: {} warnings, {} errors",
        "Summary".bold(),
        warnings.len().to_string().yellow(),
        errors.len().to_string().red()
    );

    if !errors.is_empty() {
        println!("\n{}", "✗ Errors:".red());
        for result in &errors {
            println!("  - {}: {}", result.name, result.message);
            if let Some(suggestion) = &result.suggestion {
                println!("    Fix: {}", suggestion);
            }
        }
    }

    if errors.is_empty() && warnings.is_empty() {
        println!("\n{} All checks passed!", "✓".green());
    }

    Ok(())
}

fn print_results(results: &[CheckResult], details: bool) {
    for result in results {
        let status = match result.status {
            CheckStatus::Ok => "✓".green(),
            CheckStatus::Warn => "⚠".yellow(),
            CheckStatus::Fail => "✗".red(),
        };
        println!("   {} {}: {}", status, result.name, result.message);

        if details || result.status != CheckStatus::Ok {
            if let Some(suggestion) = &result.suggestion {
                println!("     {}", suggestion.dimmed());
            }
        }
    }
}

fn check_configuration(path: &Path) -> (Config, Vec<CheckResult>) {
    let mut results = vec![CheckResult::ok(
        "has-comments version",
        env!("CARGO_PKG_VERSION"),
    )];

    if !path.exists() {
        results.push(CheckResult::warn(
            "config.toml",
            &format!("{} not found, using defaults", path.display()),
            Some("Run 'has-comments init' to create"),
        ));
        return (Config::default(), results);
    }

    match Config::load(path) {
        Ok(config) => {
            results.push(CheckResult::ok("config.toml", "valid"));
            (config, results)
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "config.toml",
                &e.to_string(),
                Some("Fix the reported value, then run 'has-comments config validate'"),
            ));
            (Config::default(), results)
        }
    }
}

fn check_storage(config: &Config) -> Vec<CheckResult> {
    let data_dir = &config.storage.data_dir;
    match FileSystemStore::new(data_dir).and_then(|store| store.all_comments()) {
        Ok(comments) => vec![CheckResult::ok(
            "data_dir",
            &format!("{} ({} comments)", data_dir.display(), comments.len()),
        )],
        Err(e) => vec![CheckResult::fail(
            "data_dir",
            &format!("{}: {}", data_dir.display(), e),
            Some("Check storage.data_dir and its permissions"),
        )],
    }
}

fn check_spam_service(config: &Config, offline: bool) -> Vec<CheckResult> {
    if !config.akismet.is_enabled() {
        return vec![CheckResult::warn(
            "Akismet",
            "disabled (no key)",
            Some("Set [akismet] key and blog to enable spam checking"),
        )];
    }

    let client = match AkismetClient::from_config(&config.akismet) {
        Ok(client) => client,
        Err(e) => return vec![CheckResult::fail("Akismet", &e.to_string(), None)],
    };

    if offline {
        return vec![CheckResult::ok(
            "Akismet",
            &format!("configured for {} (not verified)", client.endpoint()),
        )];
    }

    match client.verify_key() {
        Ok(KeyStatus::Valid) => vec![CheckResult::ok("Akismet key", "valid")],
        Ok(KeyStatus::Invalid) => vec![CheckResult::fail(
            "Akismet key",
            "rejected by the service",
            Some("Check akismet.key and akismet.blog"),
        )],
        Err(e) => vec![CheckResult::fail(
            "Akismet",
            &e.to_string(),
            Some("Check akismet.endpoint and network access, or run with --offline"),
        )],
    }
}

fn check_owner_types(config: &Config) -> Vec<CheckResult> {
    if config.owners.is_empty() {
        return vec![CheckResult::warn(
            "Owner types",
            "none configured, all owners use defaults",
            Some("Add [owners.<Type>] sections to config.toml"),
        )];
    }

    config
        .owners
        .iter()
        .map(|(owner_type, options)| {
            let methods = predicate_names(options);
            if methods.is_empty() {
                CheckResult::ok(owner_type, &describe(options))
            } else {
                CheckResult::warn(
                    owner_type,
                    &format!("{}; needs predicates {}", describe(options), methods.join(", ")),
                    Some("Supply them with 'post --predicate NAME=VALUE'"),
                )
            }
        })
        .collect()
}

fn predicate_names(options: &CommentableOptions) -> Vec<String> {
    [&options.open, &options.authorisation]
        .into_iter()
        .filter_map(|rule| match rule {
            PolicyRule::MethodRef(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn describe(options: &CommentableOptions) -> String {
    format!(
        "require_approval={}, check_spam={}, reject_on_spam={}",
        options.require_approval, options.check_spam, options.reject_on_spam
    )
}
