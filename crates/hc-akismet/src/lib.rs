//! hc-akismet - Spam classification client for has-comments
//!
//! This crate talks to the Akismet REST API (or any service speaking the
//! same protocol) and plugs into the comment manager as a
//! [`SpamChecker`](hc_core::SpamChecker).
//!
//! ## Features
//!
//! - `comment-check` classification of candidate comments
//! - `submit-spam` / `submit-ham` feedback after moderation
//! - `verify-key` credential check
//! - Bounded request timeout on every call
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hc_akismet::AkismetClient;
//! use hc_core::{CommentManager, Config};
//! use std::sync::Arc;
//!
//! let config = Config::load_or_default(path)?;
//! let checker = AkismetClient::from_config(&config.akismet)?;
//! let manager = CommentManager::with_spam_checker(store, Arc::new(checker));
//! ```

mod client;
mod error;
mod params;

pub use client::{AkismetClient, KeyStatus, USER_AGENT};
pub use error::AkismetError;
pub use params::{comment_params, CommentParams};
