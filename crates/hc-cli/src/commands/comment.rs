//! Comment commands
//!
//! Post, list, show and purge comments.

use super::context::{parse_predicate, AppContext, OwnerArgs, RequestArgs};
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use hc_core::{Comment, CommentId, CommentManager, CommentScope, NewComment, PolicyValue, UserId};
use hc_core::{Commentable, ValidationErrors};

/// Arguments for the post command
#[derive(Debug, Args)]
pub struct PostArgs {
    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Comment text
    #[arg(long, short)]
    pub body: String,

    /// Author name (public users)
    #[arg(long, short)]
    pub name: Option<String>,

    /// Author e-mail (public users)
    #[arg(long, short)]
    pub email: Option<String>,

    /// Author website
    #[arg(long, short)]
    pub url: Option<String>,

    /// Authenticated author ID (registered users)
    #[arg(long)]
    pub user_id: Option<u64>,

    /// Value of a named owner predicate, as NAME=VALUE (repeatable)
    #[arg(long = "predicate", short = 'p', value_parser = parse_predicate)]
    pub predicates: Vec<(String, PolicyValue)>,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Only run validation and policies; store nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the stored comment as JSON
    #[arg(long)]
    pub json: bool,
}

impl PostArgs {
    fn input(&self) -> NewComment {
        NewComment {
            name: self.name.clone(),
            email: self.email.clone(),
            url: self.url.clone(),
            body: self.body.clone(),
            user_id: self.user_id.map(UserId),
        }
    }
}

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Only approved comments
    #[arg(long, conflicts_with = "pending")]
    pub approved: bool,

    /// Only comments awaiting approval
    #[arg(long)]
    pub pending: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn scope(&self) -> CommentScope {
        if self.approved {
            CommentScope::Approved
        } else if self.pending {
            CommentScope::Pending
        } else {
            CommentScope::All
        }
    }
}

/// Arguments for the show command
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Comment ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the purge command
#[derive(Debug, Args)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Skip confirmation
    #[arg(long, short)]
    pub yes: bool,
}

/// Execute the post command
pub fn post(args: PostArgs, ctx: &AppContext) -> Result<()> {
    let manager = ctx.manager()?;
    let owner = ctx.owner(
        manager.store().as_ref(),
        args.owner.owner_ref(),
        &args.predicates,
    )?;
    let input = args.input();

    if args.dry_run {
        let errors = manager.validate(&input, &owner)?;
        if errors.is_empty() {
            println!("{} Comment would be accepted", "✓".green());
            return Ok(());
        }
        print_violations(&errors);
        bail!("comment is invalid ({} errors)", errors.len());
    }

    let comment = match manager.create(input, &owner, &args.request.to_context()) {
        Ok(comment) => comment,
        Err(err) => {
            if let Some(errors) = err.violations() {
                print_violations(errors);
            }
            return Err(err).context("Comment was not saved");
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comment)?);
        return Ok(());
    }

    println!(
        "{} Posted comment {} on {}",
        "✓".green(),
        comment.id.to_string().cyan(),
        comment.owner
    );
    println!("  Status: {}", state_label(&comment));
    println!(
        "  {} has {} comments, {} approved",
        comment.owner,
        owner.comments_count(),
        owner.approved_comments_count()
    );
    Ok(())
}

/// Execute the list command
pub fn list(args: ListArgs, ctx: &AppContext) -> Result<()> {
    let manager = ctx.manager()?;
    let owner = ctx.owner(manager.store().as_ref(), args.owner.owner_ref(), &[])?;
    let comments = manager.list(&owner, args.scope())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(());
    }

    if comments.is_empty() {
        println!("No comments found.");
        return Ok(());
    }

    println!("{}", format!("Comments on {}:", owner.owner_ref()).bold().underline());
    println!();
    for comment in &comments {
        println!(
            "  {} {} {}",
            comment.id.to_string().cyan(),
            state_label(comment),
            author(comment).dimmed()
        );
        println!("    {}", first_line(&comment.body));
    }
    println!();
    println!(
        "{} comments, {} approved",
        owner.comments_count(),
        owner.approved_comments_count()
    );
    Ok(())
}

/// Execute the show command
pub fn show(args: ShowArgs, ctx: &AppContext) -> Result<()> {
    let manager = ctx.manager()?;
    let comment = load_comment(&manager, &args.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comment)?);
    } else {
        print_comment(&comment);
    }
    Ok(())
}

/// Execute the purge command
pub fn purge(args: PurgeArgs, ctx: &AppContext) -> Result<()> {
    if !args.yes {
        eprintln!(
            "{} This deletes every comment on {}. Re-run with --yes to confirm.",
            "⚠".yellow(),
            args.owner.owner_ref()
        );
        bail!("purge not confirmed");
    }

    let manager = ctx.manager()?;
    let owner = ctx.owner(manager.store().as_ref(), args.owner.owner_ref(), &[])?;
    let removed = manager.destroy_comments_for(&owner)?;
    println!(
        "{} Deleted {} comments of {}",
        "✓".green(),
        removed,
        owner.owner_ref()
    );
    Ok(())
}

/// Load a comment by its printed ID
pub fn load_comment(manager: &CommentManager, id: &str) -> Result<Comment> {
    let comment_id =
        CommentId::from_string(id).with_context(|| format!("Invalid comment ID: {}", id))?;
    Ok(manager.get(&comment_id)?)
}

pub fn print_comment(comment: &Comment) {
    println!("{} {}", "Comment".bold(), comment.id.to_string().cyan());
    println!("  On:      {}", comment.owner);
    println!("  Author:  {}", author(comment));
    if let Some(url) = &comment.url {
        println!("  Website: {}", url);
    }
    println!("  Status:  {}", state_label(comment));
    println!(
        "  Created: {}",
        comment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(approved_at) = comment.approved_at {
        println!("  Approved: {}", approved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();
    println!("{}", comment.body);
}

fn print_violations(errors: &ValidationErrors) {
    for violation in errors.violations() {
        eprintln!("{} {}", "✗".red(), violation);
    }
}

pub fn state_label(comment: &Comment) -> String {
    let state = comment.state().to_string();
    let state = if comment.is_approved() {
        state.green()
    } else {
        state.yellow()
    };
    if comment.is_spam() {
        format!("{} {}", state, "spam".red())
    } else {
        state.to_string()
    }
}

fn author(comment: &Comment) -> String {
    match comment.identity() {
        Some(identity) => identity.to_string(),
        None => "anonymous".to_string(),
    }
}

fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or("")
}
