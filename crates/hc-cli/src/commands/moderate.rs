//! Moderation commands
//!
//! Approve, unapprove and classify stored comments.

use super::comment::{load_comment, state_label};
use super::context::{AppContext, RequestArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Arguments for approve and unapprove
#[derive(Debug, Args)]
pub struct ApprovalArgs {
    /// Comment ID
    pub id: String,
}

/// Arguments for spam and ham
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Comment ID
    pub id: String,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Which transition to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approve,
    Unapprove,
}

/// Which classification to record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Spam,
    Ham,
}

/// Execute approve / unapprove
pub fn approval(args: ApprovalArgs, action: Approval, ctx: &AppContext) -> Result<()> {
    let manager = ctx.manager()?;
    let comment = load_comment(&manager, &args.id)?;
    let owner = ctx.owner(manager.store().as_ref(), comment.owner.clone(), &[])?;

    let was_approved = comment.is_approved();
    let comment = match action {
        Approval::Approve => manager.approve(comment, &owner)?,
        Approval::Unapprove => manager.unapprove(comment, &owner)?,
    };

    let verb = match action {
        Approval::Approve => "Approved",
        Approval::Unapprove => "Unapproved",
    };
    if was_approved == comment.is_approved() {
        println!(
            "{} Comment {} is already {}",
            "•".dimmed(),
            comment.id.to_string().cyan(),
            state_label(&comment)
        );
    } else {
        println!(
            "{} {} comment {}",
            "✓".green(),
            verb,
            comment.id.to_string().cyan()
        );
    }
    println!(
        "  {} has {} approved comments",
        comment.owner,
        owner.approved_comments_count()
    );
    Ok(())
}

/// Execute spam / ham
pub fn classify(args: ClassifyArgs, class: Classification, ctx: &AppContext) -> Result<()> {
    let manager = ctx.manager()?;
    let comment = load_comment(&manager, &args.id)?;
    let request = args.request.to_context();

    let was_spam = comment.is_spam();
    let comment = match class {
        Classification::Spam => manager.mark_spam(comment, &request)?,
        Classification::Ham => manager.mark_ham(comment, &request)?,
    };

    let label = match class {
        Classification::Spam => "spam",
        Classification::Ham => "ham",
    };
    if was_spam == comment.is_spam() {
        println!(
            "{} Comment {} is already marked as {}",
            "•".dimmed(),
            comment.id.to_string().cyan(),
            label
        );
    } else {
        println!(
            "{} Marked comment {} as {}",
            "✓".green(),
            comment.id.to_string().cyan(),
            label
        );
    }
    Ok(())
}
