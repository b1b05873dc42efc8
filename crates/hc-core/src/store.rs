//! Comment storage trait and abstractions

use crate::comment::{sort_by_recency, Comment, CommentScope, Identity};
use crate::error::{HasCommentsError, Result};
use crate::types::{CommentId, OwnerRef};

/// Trait for comment storage implementations
pub trait CommentStore: Send + Sync {
    /// Persist a new comment
    fn insert(&self, comment: &Comment) -> Result<CommentId>;

    /// Overwrite a stored comment
    fn update(&self, comment: &Comment) -> Result<()>;

    /// Load a comment by ID
    fn get(&self, id: &CommentId) -> Result<Comment>;

    /// Whether any stored comment was written by `identity`
    fn exists_with_identity(&self, identity: &Identity) -> Result<bool>;

    /// An owner's comments in `scope`, newest first
    fn list_for_owner(&self, owner: &OwnerRef, scope: CommentScope) -> Result<Vec<Comment>>;

    /// Delete every comment of an owner, returning how many went
    fn delete_for_owner(&self, owner: &OwnerRef) -> Result<usize>;

    /// Number of approved comments of an owner
    fn count_approved_for_owner(&self, owner: &OwnerRef) -> Result<usize> {
        Ok(self.list_for_owner(owner, CommentScope::Approved)?.len())
    }

    /// Number of comments of an owner
    fn count_for_owner(&self, owner: &OwnerRef) -> Result<usize> {
        Ok(self.list_for_owner(owner, CommentScope::All)?.len())
    }

    /// Check if a comment exists
    fn exists(&self, id: &CommentId) -> bool {
        self.get(id).is_ok()
    }
}

/// Turn a poisoned lock into a storage error
pub(crate) fn poisoned<T>(_: T) -> HasCommentsError {
    HasCommentsError::Storage("comment store lock poisoned".to_string())
}

mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// In-memory comment storage
    ///
    /// Used by tests and by hosts that only need comments for the lifetime
    /// of the process.
    pub struct MemoryStore {
        comments: RwLock<HashMap<CommentId, Comment>>,
    }

    impl MemoryStore {
        /// Create a new in-memory store
        pub fn new() -> Self {
            Self {
                comments: RwLock::new(HashMap::new()),
            }
        }

        /// Number of stored comments
        pub fn len(&self) -> usize {
            self.comments.read().map(|c| c.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl Default for MemoryStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CommentStore for MemoryStore {
        fn insert(&self, comment: &Comment) -> Result<CommentId> {
            let mut comments = self.comments.write().map_err(poisoned)?;
            if comments.contains_key(&comment.id) {
                return Err(HasCommentsError::Storage(format!(
                    "Comment with ID {} already exists",
                    comment.id
                )));
            }
            comments.insert(comment.id.clone(), comment.clone());
            Ok(comment.id.clone())
        }

        fn update(&self, comment: &Comment) -> Result<()> {
            let mut comments = self.comments.write().map_err(poisoned)?;
            let slot = comments
                .get_mut(&comment.id)
                .ok_or_else(|| HasCommentsError::CommentNotFound(comment.id.to_string()))?;
            *slot = comment.clone();
            Ok(())
        }

        fn get(&self, id: &CommentId) -> Result<Comment> {
            let comments = self.comments.read().map_err(poisoned)?;
            comments
                .get(id)
                .cloned()
                .ok_or_else(|| HasCommentsError::CommentNotFound(id.to_string()))
        }

        fn exists_with_identity(&self, identity: &Identity) -> Result<bool> {
            let comments = self.comments.read().map_err(poisoned)?;
            Ok(comments.values().any(|c| identity.matches(c)))
        }

        fn list_for_owner(&self, owner: &OwnerRef, scope: CommentScope) -> Result<Vec<Comment>> {
            let comments = self.comments.read().map_err(poisoned)?;
            let mut found: Vec<Comment> = comments
                .values()
                .filter(|c| &c.owner == owner && scope.includes(c))
                .cloned()
                .collect();
            sort_by_recency(&mut found);
            Ok(found)
        }

        fn delete_for_owner(&self, owner: &OwnerRef) -> Result<usize> {
            let mut comments = self.comments.write().map_err(poisoned)?;
            let before = comments.len();
            comments.retain(|_, c| &c.owner != owner);
            Ok(before - comments.len())
        }
    }

}

pub use memory::MemoryStore;
