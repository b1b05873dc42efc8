//! hc-core - Core library for has-comments
//!
//! This crate lets any domain entity accept comments: validation of the
//! submitted content, owner policies (open, authorisation, approval mode,
//! spam checking), moderation transitions, and the owner's counter cache.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hc_core::{CommentBuilder, CommentManager, CommentableOptions, CommentableRecord};
//! use hc_core::{MemoryStore, OwnerRef, RequestContext};
//! use std::sync::Arc;
//!
//! let manager = CommentManager::new(Arc::new(MemoryStore::new()));
//! let post = CommentableRecord::new(OwnerRef::new("Post", 1), Arc::new(CommentableOptions::default()));
//!
//! let input = CommentBuilder::input().body("Nice post").user_id(7u64).into_input();
//! let comment = manager.create(input, &post, &RequestContext::default())?;
//! let comment = manager.approve(comment, &post)?;
//! ```

pub mod comment;
pub mod commentable;
pub mod config;
pub mod error;
pub mod options;
pub mod policy;
pub mod spam;
pub mod store;
pub mod types;

pub use comment::{
    Comment, CommentBuilder, CommentManager, CommentScope, Identity, ModerationState, NewComment,
    ValidationErrors, Violation,
};
pub use commentable::{Commentable, CommentableRecord, CounterCache};
pub use config::Config;
pub use error::{HasCommentsError, Result};
pub use options::{CommentableOptions, RequireApproval};
pub use policy::{PolicyRule, PolicyValue};
pub use spam::{NullSpamChecker, RequestContext, SpamCheckError, SpamChecker};
pub use store::{CommentStore, MemoryStore};
pub use types::*;
