//! The owner side of commenting
//!
//! A domain entity that accepts comments implements [`Commentable`] (or
//! holds a [`CommentableRecord`]) instead of inheriting behaviour. The
//! trait gives it the policy predicates and the counter cache hooks the
//! [`CommentManager`](crate::comment::CommentManager) relies on.

use crate::error::Result;
use crate::options::{CommentableOptions, RequireApproval};
use crate::policy::{evaluate, PolicyCallback, PolicyTarget, PolicyValue};
use crate::store::CommentStore;
use crate::types::{OwnerRef, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Denormalized comment counts kept on the owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterCache {
    pub comments_count: usize,
    pub approved_comments_count: usize,
}

/// Capability of an entity that owns comments
pub trait Commentable: Send + Sync {
    /// Polymorphic reference stored on this owner's comments
    fn owner_ref(&self) -> OwnerRef;

    /// Options of this owner's type
    fn options(&self) -> &CommentableOptions;

    /// Answer a named predicate referenced by a policy rule
    fn call_predicate(&self, _name: &str, _user_id: Option<UserId>) -> Option<PolicyValue> {
        None
    }

    /// Write the total comment count
    fn set_comments_count(&self, count: usize);

    /// Write the approved comment count
    fn set_approved_comments_count(&self, count: usize);

    /// Current counter cache values
    fn counter_cache(&self) -> CounterCache;

    /// Whether the owner accepts comments, as answered by its `open` rule
    fn open_for_comments(&self) -> Result<PolicyValue> {
        evaluate(&self.options().open, &OwnerPolicy(self), None)
    }

    /// Whether `user_id` may comment, as answered by the `authorisation` rule
    fn authorised_for_comments(&self, user_id: Option<UserId>) -> Result<PolicyValue> {
        evaluate(&self.options().authorisation, &OwnerPolicy(self), user_id)
    }

    /// Moderation mode for new comments
    fn auto_approve_comments(&self) -> RequireApproval {
        self.options().require_approval
    }

    /// Recount approved comments from the store and cache the result
    fn recalculate_approved_count(&self, store: &dyn CommentStore) -> Result<usize> {
        let count = store.count_approved_for_owner(&self.owner_ref())?;
        self.set_approved_comments_count(count);
        Ok(count)
    }

    /// Recount all comments from the store and cache the result
    fn recalculate_comments_count(&self, store: &dyn CommentStore) -> Result<usize> {
        let count = store.count_for_owner(&self.owner_ref())?;
        self.set_comments_count(count);
        Ok(count)
    }
}

struct OwnerPolicy<'a, T: ?Sized>(&'a T);

impl<T: Commentable + ?Sized> PolicyTarget for OwnerPolicy<'_, T> {
    fn policy_owner_type(&self) -> String {
        self.0.owner_ref().owner_type
    }

    fn call_predicate(&self, name: &str, user_id: Option<UserId>) -> Option<PolicyValue> {
        self.0.call_predicate(name, user_id)
    }
}

/// Ready-made [`Commentable`] for hosts that keep owners as plain records
///
/// Named predicates are registered up front; counts live in atomics so the
/// record can be shared between threads.
pub struct CommentableRecord {
    owner: OwnerRef,
    options: Arc<CommentableOptions>,
    predicates: HashMap<String, PolicyCallback>,
    comments_count: AtomicUsize,
    approved_comments_count: AtomicUsize,
}

impl CommentableRecord {
    /// Create a record for `owner` with its type's options
    pub fn new(owner: OwnerRef, options: Arc<CommentableOptions>) -> Self {
        Self {
            owner,
            options,
            predicates: HashMap::new(),
            comments_count: AtomicUsize::new(0),
            approved_comments_count: AtomicUsize::new(0),
        }
    }

    /// Register a named predicate that rules can reference
    pub fn with_predicate<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<UserId>) -> PolicyValue + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Seed the counter cache, e.g. from a persisted owner row
    pub fn with_counts(self, counts: CounterCache) -> Self {
        self.comments_count.store(counts.comments_count, Ordering::SeqCst);
        self.approved_comments_count
            .store(counts.approved_comments_count, Ordering::SeqCst);
        self
    }

    pub fn comments_count(&self) -> usize {
        self.comments_count.load(Ordering::SeqCst)
    }

    pub fn approved_comments_count(&self) -> usize {
        self.approved_comments_count.load(Ordering::SeqCst)
    }
}

impl Commentable for CommentableRecord {
    fn owner_ref(&self) -> OwnerRef {
        self.owner.clone()
    }

    fn options(&self) -> &CommentableOptions {
        &self.options
    }

    fn call_predicate(&self, name: &str, user_id: Option<UserId>) -> Option<PolicyValue> {
        self.predicates.get(name).map(|predicate| predicate(user_id))
    }

    fn set_comments_count(&self, count: usize) {
        self.comments_count.store(count, Ordering::SeqCst);
    }

    fn set_approved_comments_count(&self, count: usize) {
        self.approved_comments_count.store(count, Ordering::SeqCst);
    }

    fn counter_cache(&self) -> CounterCache {
        CounterCache {
            comments_count: self.comments_count(),
            approved_comments_count: self.approved_comments_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyRule;
    use crate::store::MemoryStore;
    use crate::HasCommentsError;

    fn post(options: CommentableOptions) -> CommentableRecord {
        CommentableRecord::new(OwnerRef::new("Post", 1), Arc::new(options))
    }

    #[test]
    fn test_open_literal() {
        let record = post(CommentableOptions::new().open(true));
        assert_eq!(record.open_for_comments().unwrap(), true);

        let record = post(CommentableOptions::new().open(false));
        assert_eq!(record.open_for_comments().unwrap(), false);
    }

    #[test]
    fn test_open_named_predicate() {
        let record = post(CommentableOptions::new().open(PolicyRule::method("open?")))
            .with_predicate("open?", |_| PolicyValue::from(false));
        assert_eq!(record.open_for_comments().unwrap(), false);
    }

    #[test]
    fn test_open_callback_is_not_coerced() {
        let options = CommentableOptions::new().open(PolicyRule::callback(|user_id| {
            assert!(user_id.is_none());
            PolicyValue::from("yes")
        }));
        let record = post(options);
        assert_eq!(record.open_for_comments().unwrap(), "yes");
    }

    #[test]
    fn test_authorisation_passes_user_id() {
        let record = post(CommentableOptions::new().authorisation(PolicyRule::method("auth?")))
            .with_predicate("auth?", |user_id| PolicyValue::from(user_id == Some(UserId(1))));

        assert_eq!(record.authorised_for_comments(Some(UserId(1))).unwrap(), true);
        assert_eq!(record.authorised_for_comments(Some(UserId(2))).unwrap(), false);
        assert_eq!(record.authorised_for_comments(None).unwrap(), false);
    }

    #[test]
    fn test_authorisation_callback() {
        let options = CommentableOptions::new()
            .authorisation(PolicyRule::callback(|user_id| PolicyValue::from(user_id.is_some())));
        let record = post(options);
        assert_eq!(record.authorised_for_comments(Some(UserId(1))).unwrap(), true);
        assert_eq!(record.authorised_for_comments(None).unwrap(), false);
    }

    #[test]
    fn test_missing_predicate_is_an_error() {
        let record = post(CommentableOptions::new().open(PolicyRule::method("nope")));
        let err = record.open_for_comments().unwrap_err();
        assert!(matches!(
            err,
            HasCommentsError::UnknownPolicyMethod { ref owner_type, .. } if owner_type == "Post"
        ));
    }

    #[test]
    fn test_recalculate_from_empty_store() {
        let store = MemoryStore::new();
        let record = post(CommentableOptions::default()).with_counts(CounterCache {
            comments_count: 9,
            approved_comments_count: 5,
        });

        assert_eq!(record.recalculate_approved_count(&store).unwrap(), 0);
        assert_eq!(record.recalculate_comments_count(&store).unwrap(), 0);
        assert_eq!(record.counter_cache(), CounterCache::default());
    }
}
