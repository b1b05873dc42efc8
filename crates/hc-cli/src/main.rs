//! has-comments - comment moderation from the command line
//!
//! Lets any record (a post, a page, a product) accept comments, with
//! validation, approval rules, spam checking and counter caches.
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize in your project
//! has-comments init
//!
//! # Post a comment
//! has-comments post --owner-type Post --owner-id 1 \
//!     --name arjan --email arjan@arjan.com --body "Nice post"
//!
//! # Moderate
//! has-comments list --owner-type Post --owner-id 1 --pending
//! has-comments approve <comment-id>
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
