//! hc-storage - Storage library for has-comments
//!
//! This crate provides persistent [`CommentStore`](hc_core::store::CommentStore)
//! implementations.

mod comment_store;

pub use comment_store::{FileSystemStore, OwnerFile, CURRENT_SCHEMA_VERSION};
